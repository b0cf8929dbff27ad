use axum::{extract::State, Extension, Json};
use invitecard_shared::auth::Claims;
use invitecard_shared::models::now_str;
use invitecard_shared::store::UserStore;
use log::{info, warn};

use crate::error::{AppError, Result};
use crate::models::LoginRequest;
use crate::state::AppState;

// POST /auth/login
// Mock login: any known e-mail signs in, no password is checked.
pub async fn login<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>>
where
    S: UserStore,
{
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required".into()));
    }

    let mut user = match state.store.get_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email");
            return Err(AppError::unauthorized("Invalid credentials".into()));
        }
    };

    user.last_login = Some(now_str());
    let user = state.store.update_user(user).await?;
    let token = state.keys.issue_token(&user, state.config.token_ttl())?;

    info!("User {} logged in", user.id);

    Ok(Json(serde_json::json!({
        "token": token,
        "user": user
    })))
}

// GET /me
pub async fn me<S>(
    State(state): State<AppState<S>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>>
where
    S: UserStore,
{
    let user = state.store.get_user(&claims.sub).await?;
    Ok(Json(serde_json::json!({ "user": user })))
}
