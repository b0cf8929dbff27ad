//! Scan sessions: `Idle -> Scanning -> (found | timed out | error) -> Idle`.
//!
//! The poll loop, the timeout and external cancellation race inside one
//! `select!` that shares a single [`CancellationToken`], so whichever wins
//! is the only path that tears the session down.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use invitecard_shared::models::User;
use invitecard_shared::payload::{PayloadCodec, PayloadError};

use crate::camera::{Camera, CameraError, Facing, FrameStream};
use crate::detector::BarcodeDetector;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Delay between two frame samples.
    pub poll_interval: Duration,
    /// How long a scan may run without finding a code.
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(#[from] CameraError),

    #[error("No QR code detected within {} seconds", .0.as_secs())]
    DetectionTimeout(Duration),

    #[error("Scanned code is not a valid invitation: {0}")]
    PayloadParseFailure(#[from] PayloadError),

    #[error("Scan was cancelled")]
    Cancelled,

    #[error("A scan is already in progress")]
    AlreadyScanning,
}

impl ScanError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::CameraUnavailable(_) => "camera_unavailable",
            ScanError::DetectionTimeout(_) => "detection_timeout",
            ScanError::PayloadParseFailure(_) => "payload_parse_failure",
            ScanError::Cancelled => "cancelled",
            ScanError::AlreadyScanning => "already_scanning",
        }
    }
}

/// Runs at most one scan at a time against a camera.
pub struct Scanner<C, D> {
    camera: Arc<C>,
    detector: D,
    codec: PayloadCodec,
    config: ScanConfig,
    active: Arc<Mutex<Option<CancellationToken>>>,
    state: Arc<watch::Sender<ScanState>>,
}

/// Returns the scanner to `Idle` when the scan ends, however it ends.
struct ActiveScan {
    slot: Arc<Mutex<Option<CancellationToken>>>,
    state: Arc<watch::Sender<ScanState>>,
    token: CancellationToken,
}

impl Drop for ActiveScan {
    fn drop(&mut self) {
        self.token.cancel();
        self.slot.lock().take();
        self.state.send_replace(ScanState::Idle);
    }
}

impl<C, D> Scanner<C, D>
where
    C: Camera,
    D: BarcodeDetector,
{
    pub fn new(camera: Arc<C>, detector: D, codec: PayloadCodec, config: ScanConfig) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            camera,
            detector,
            codec,
            config,
            active: Arc::new(Mutex::new(None)),
            state: Arc::new(state),
        }
    }

    pub fn camera(&self) -> &Arc<C> {
        &self.camera
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// Stops the active scan, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                info!("Cancelling active scan");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Scans until a code is decoded, the timeout elapses or the scan is
    /// cancelled. The camera stream is released before this returns.
    pub async fn scan(&self) -> Result<User, ScanError> {
        let session = self.claim()?;
        let stream = self.open().await?;
        self.run(session, stream).await
    }

    /// Claims the scanner and opens the camera, then polls on a background
    /// task. Frames can be fed to the camera as soon as this returns, and a
    /// caller that goes away cannot leave the camera open.
    pub async fn start(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<Result<User, ScanError>>, ScanError>
    where
        C: 'static,
        D: 'static,
    {
        let session = self.claim()?;
        let stream = self.open().await?;
        let scanner = Arc::clone(self);
        Ok(tokio::spawn(async move { scanner.run(session, stream).await }))
    }

    fn claim(&self) -> Result<ActiveScan, ScanError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(ScanError::AlreadyScanning);
        }

        let token = CancellationToken::new();
        *active = Some(token.clone());
        self.state.send_replace(ScanState::Scanning);
        Ok(ActiveScan {
            slot: Arc::clone(&self.active),
            state: Arc::clone(&self.state),
            token,
        })
    }

    async fn open(&self) -> Result<Box<dyn FrameStream>, ScanError> {
        self.camera.open(Facing::Environment).await.map_err(|e| {
            warn!("Could not open camera: {}", e);
            ScanError::CameraUnavailable(e)
        })
    }

    async fn run(
        &self,
        session: ActiveScan,
        mut stream: Box<dyn FrameStream>,
    ) -> Result<User, ScanError> {
        info!(
            "Scan started (poll every {:?}, timeout {:?})",
            self.config.poll_interval, self.config.timeout
        );

        let result = self.poll(stream.as_mut(), &session.token).await;
        stream.stop();
        match &result {
            Ok(user) => info!("Scan found invitation for user id={}", user.id),
            Err(e) => warn!("Scan ended without a result: {}", e),
        }
        drop(session);
        result
    }

    async fn poll(
        &self,
        stream: &mut dyn FrameStream,
        token: &CancellationToken,
    ) -> Result<User, ScanError> {
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ScanError::Cancelled),
                _ = &mut deadline => return Err(ScanError::DetectionTimeout(self.config.timeout)),
                _ = ticker.tick() => {
                    let Some(frame) = stream.next_frame().await? else {
                        continue;
                    };
                    if let Some(raw) = self.detector.detect(&frame).into_iter().next() {
                        debug!("Detected code with {} bytes of payload", raw.len());
                        return Ok(self.codec.decode(&raw)?);
                    }
                }
            }
        }
    }
}
