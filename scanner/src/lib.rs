//! Verification side of the invitation QR round-trip.
//!
//! A [`Scanner`] pulls frames from a [`Camera`], looks for QR codes with a
//! [`BarcodeDetector`] and turns the first payload it finds back into a
//! [`User`](invitecard_shared::models::User).

pub mod camera;
pub mod detector;
pub mod session;

pub use camera::{Camera, CameraError, ChannelCamera, Frame, FrameStream};
pub use detector::{BarcodeDetector, QrDetector};
pub use session::{ScanConfig, ScanError, ScanState, Scanner};
