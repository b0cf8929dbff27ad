use async_trait::async_trait;
use image::GrayImage;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera access was denied")]
    PermissionDenied,

    #[error("No camera available: {0}")]
    Unavailable(String),

    #[error("Camera is already streaming")]
    Busy,

    #[error("Camera is not streaming")]
    NotStreaming,

    #[error("Camera stream disconnected")]
    Disconnected,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Which way the requested camera should point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, pointed at the code being verified.
    Environment,
}

/// A single 8-bit greyscale video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub luma: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, luma: Vec<u8>) -> Result<Self, CameraError> {
        if luma.len() != width * height {
            return Err(CameraError::InvalidFrame(format!(
                "expected {} bytes for {}x{}, got {}",
                width * height,
                width,
                height,
                luma.len()
            )));
        }
        Ok(Self {
            width,
            height,
            luma,
        })
    }

    pub fn from_gray_image(img: GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            luma: img.into_raw(),
        }
    }

    /// Decodes an encoded still (PNG, JPEG) into a greyscale frame.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, CameraError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| CameraError::InvalidFrame(e.to_string()))?;
        Ok(Self::from_gray_image(img.to_luma8()))
    }

    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        self.luma[y * self.width + x]
    }
}

/// Source of video streams, e.g. a device camera.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn open(&self, facing: Facing) -> Result<Box<dyn FrameStream>, CameraError>;
}

/// An open camera stream. Holding one keeps the device in use.
#[async_trait]
pub trait FrameStream: Send {
    /// Most recent frame, or `None` when nothing new has arrived.
    async fn next_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Releases the device. Idempotent.
    fn stop(&mut self);
}

/// Camera fed from outside the process, one stream at a time.
///
/// Frames are pushed with [`ChannelCamera::push_frame`] (typically uploads
/// from a browser that owns the physical camera) and only the newest frame
/// is handed to the reader.
pub struct ChannelCamera {
    sender: Arc<Mutex<Option<mpsc::Sender<Frame>>>>,
    capacity: usize,
}

impl Default for ChannelCamera {
    fn default() -> Self {
        Self::new(8)
    }
}

impl ChannelCamera {
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            capacity: capacity.max(1),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.sender.lock().is_some()
    }

    pub fn push_frame(&self, frame: Frame) -> Result<(), CameraError> {
        let slot = self.sender.lock();
        let sender = slot.as_ref().ok_or(CameraError::NotStreaming)?;
        match sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                debug!("Frame buffer full, dropping frame");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(CameraError::NotStreaming),
        }
    }
}

#[async_trait]
impl Camera for ChannelCamera {
    async fn open(&self, facing: Facing) -> Result<Box<dyn FrameStream>, CameraError> {
        let receiver = {
            let mut slot = self.sender.lock();
            if slot.is_some() {
                return Err(CameraError::Busy);
            }
            let (sender, receiver) = mpsc::channel(self.capacity);
            *slot = Some(sender);
            receiver
        };

        info!("Channel camera stream opened (facing={:?})", facing);
        Ok(Box::new(ChannelStream {
            receiver,
            slot: Arc::clone(&self.sender),
            stopped: false,
        }))
    }
}

struct ChannelStream {
    receiver: mpsc::Receiver<Frame>,
    slot: Arc<Mutex<Option<mpsc::Sender<Frame>>>>,
    stopped: bool,
}

#[async_trait]
impl FrameStream for ChannelStream {
    async fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        if self.stopped {
            return Err(CameraError::NotStreaming);
        }

        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if latest.is_none() {
                        return Err(CameraError::Disconnected);
                    }
                    break;
                }
            }
        }
        Ok(latest)
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.receiver.close();
        self.slot.lock().take();
        info!("Channel camera stream stopped");
    }
}

impl Drop for ChannelStream {
    fn drop(&mut self) {
        self.stop();
    }
}
