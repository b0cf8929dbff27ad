use invitecard_scanner::{ChannelCamera, QrDetector, Scanner};
use invitecard_shared::auth::AuthKeys;
use invitecard_shared::payload::PayloadCodec;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::models::ScanReport;

pub type DoorScanner = Scanner<ChannelCamera, QrDetector>;

/// Everything the handlers share. `S` is the user store backing the service.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub codec: PayloadCodec,
    pub keys: AuthKeys,
    pub scanner: Arc<DoorScanner>,
    pub last_scan: Arc<Mutex<Option<ScanReport>>>,
    pub config: Arc<ServiceConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            keys: self.keys.clone(),
            scanner: Arc::clone(&self.scanner),
            last_scan: Arc::clone(&self.last_scan),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        let codec = PayloadCodec::new(config.payload_signing_key.as_deref().map(str::as_bytes));
        let scanner = Scanner::new(
            Arc::new(ChannelCamera::default()),
            QrDetector,
            codec.clone(),
            config.scan_config(),
        );

        Self {
            store,
            codec,
            keys: AuthKeys::new(config.jwt_secret.as_bytes()),
            scanner: Arc::new(scanner),
            last_scan: Arc::new(Mutex::new(None)),
            config: Arc::new(config),
        }
    }

    pub fn camera(&self) -> &ChannelCamera {
        self.scanner.camera()
    }
}
