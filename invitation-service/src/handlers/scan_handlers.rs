use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use invitecard_scanner::Frame;
use invitecard_shared::models::MessageResponse;
use invitecard_shared::store::UserStore;
use log::{debug, error, info};

use crate::error::{AppError, Result};
use crate::models::ScanReport;
use crate::state::AppState;

// POST /scanner/start
pub async fn start_scan<S>(
    State(state): State<AppState<S>>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: UserStore,
{
    let handle = state.scanner.start().await?;
    state.last_scan.lock().take();

    let last_scan = state.last_scan.clone();
    tokio::spawn(async move {
        let report = match handle.await {
            Ok(result) => ScanReport::from_result(&result),
            Err(e) => {
                error!("Scan task failed: {}", e);
                return;
            }
        };
        debug!("Scan finished with outcome {}", report.outcome);
        *last_scan.lock() = Some(report);
    });

    info!("Scan started over HTTP");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "state": state.scanner.state().as_str(),
            "timeoutMs": state.scanner.config().timeout.as_millis() as u64
        })),
    ))
}

// POST /scanner/frames
pub async fn push_frame<S>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<StatusCode>
where
    S: UserStore,
{
    if !state.camera().is_streaming() {
        return Err(AppError::conflict("No scan is in progress".into()));
    }

    let frame = tokio::task::spawn_blocking(move || Frame::from_image_bytes(&body))
        .await
        .map_err(|e| AppError::internal(format!("Frame decoding failed: {}", e)))??;
    state.camera().push_frame(frame)?;

    Ok(StatusCode::ACCEPTED)
}

// GET /scanner
pub async fn scan_status<S>(State(state): State<AppState<S>>) -> Json<serde_json::Value>
where
    S: UserStore,
{
    let last = state.last_scan.lock().clone();
    Json(serde_json::json!({
        "state": state.scanner.state().as_str(),
        "lastResult": last
    }))
}

// DELETE /scanner
pub async fn cancel_scan<S>(State(state): State<AppState<S>>) -> Result<Json<MessageResponse>>
where
    S: UserStore,
{
    if !state.scanner.cancel() {
        return Err(AppError::conflict("No scan is in progress".into()));
    }
    Ok(Json(MessageResponse::new("Scan cancelled")))
}
