use axum::{body::Bytes, extract::State, Json};
use invitecard_scanner::{BarcodeDetector, Frame, QrDetector};
use invitecard_shared::models::User;
use invitecard_shared::store::UserStore;
use log::{info, warn};

use crate::error::{AppError, Result};
use crate::models::VerifyRequest;
use crate::state::AppState;

fn verified(user: User) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "verified": true,
        "user": user
    }))
}

// POST /verify
pub async fn verify_payload<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: UserStore,
{
    let user = state.codec.decode(&request.payload)?;
    info!("Verified payload for user {}", user.id);
    Ok(verified(user))
}

// POST /verify/image
// Body is a PNG or JPEG still containing the invitation QR code.
pub async fn verify_image<S>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>>
where
    S: UserStore,
{
    if body.is_empty() {
        return Err(AppError::bad_request("Image body is empty".into()));
    }

    let codes = tokio::task::spawn_blocking(move || {
        Frame::from_image_bytes(&body).map(|frame| QrDetector.detect(&frame))
    })
    .await
    .map_err(|e| AppError::internal(format!("Detection task failed: {}", e)))??;

    let raw = codes.into_iter().next().ok_or_else(|| {
        warn!("No QR code found in uploaded image");
        AppError::unprocessable("No QR code found in image".into())
    })?;

    let user = state.codec.decode(&raw)?;
    info!("Verified image for user {}", user.id);
    Ok(verified(user))
}
