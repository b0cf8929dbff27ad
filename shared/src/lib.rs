pub mod auth;
pub mod models;
pub mod payload;
pub mod qr;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
