use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use invitecard_scanner::{CameraError, ScanError};
use invitecard_shared::auth::AuthError;
use invitecard_shared::payload::PayloadError;
use invitecard_shared::qr::QrError;
use invitecard_shared::store::StoreError;
use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RequestTimeout(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: String) -> Self {
        AppError::BadRequest(msg)
    }

    pub fn unauthorized(msg: String) -> Self {
        AppError::Unauthorized(msg)
    }

    pub fn conflict(msg: String) -> Self {
        AppError::Conflict(msg)
    }

    pub fn unprocessable(msg: String) -> Self {
        AppError::Unprocessable(msg)
    }

    pub fn internal(msg: String) -> Self {
        AppError::Internal(msg)
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::Unprocessable(err.to_string())
    }
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        match err {
            QrError::PayloadTooLarge(_) => AppError::Unprocessable(err.to_string()),
            QrError::Image(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        match err {
            CameraError::InvalidFrame(_) => AppError::BadRequest(err.to_string()),
            CameraError::NotStreaming | CameraError::Busy => AppError::Conflict(err.to_string()),
            CameraError::PermissionDenied
            | CameraError::Unavailable(_)
            | CameraError::Disconnected => AppError::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::CameraUnavailable(_) => AppError::ServiceUnavailable(err.to_string()),
            ScanError::DetectionTimeout(_) => AppError::RequestTimeout(err.to_string()),
            ScanError::PayloadParseFailure(_) => AppError::Unprocessable(err.to_string()),
            ScanError::AlreadyScanning => AppError::Conflict(err.to_string()),
            ScanError::Cancelled => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::Forbidden => AppError::Forbidden(err.to_string()),
            AuthError::TokenCreation(_) | AuthError::Lookup(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
