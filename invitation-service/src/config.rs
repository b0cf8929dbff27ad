use config::{Config, ConfigError, Environment};
use invitecard_scanner::ScanConfig;
use serde::Deserialize;
use std::time::Duration;

/// Service settings, read from `INVITE_*` environment variables.
///
/// `INVITE_BIND_ADDRESS=0.0.0.0:8080` sets `bind_address`, and so on.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Prefix every route is nested under, empty for none
    #[serde(default)]
    pub route_prefix: String,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// When set, QR payloads are signed and unsigned codes are rejected
    #[serde(default)]
    pub payload_signing_key: Option<String>,

    /// Edge length of rendered QR codes in pixels
    #[serde(default = "default_qr_size_px")]
    pub qr_size_px: u32,

    #[serde(default = "default_scan_poll_interval_ms")]
    pub scan_poll_interval_ms: u64,

    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,

    /// Largest accepted image upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Start with the demo admin and attendees in the store
    #[serde(default = "default_seed_demo_users")]
    pub seed_demo_users: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

const DEFAULT_JWT_SECRET: &str = "change-me";

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_qr_size_px() -> u32 {
    256
}

fn default_scan_poll_interval_ms() -> u64 {
    100
}

fn default_scan_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_seed_demo_users() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bind_address: default_bind_address(),
            route_prefix: String::new(),
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            payload_signing_key: None,
            qr_size_px: default_qr_size_px(),
            scan_poll_interval_ms: default_scan_poll_interval_ms(),
            scan_timeout_secs: default_scan_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            seed_demo_users: default_seed_demo_users(),
        }
    }
}

impl ServiceConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("INVITE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            poll_interval: Duration::from_millis(self.scan_poll_interval_ms),
            timeout: Duration::from_secs(self.scan_timeout_secs),
        }
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}
