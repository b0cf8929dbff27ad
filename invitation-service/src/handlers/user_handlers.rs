use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use invitecard_shared::auth::Claims;
use invitecard_shared::models::{now_str, MessageResponse, User};
use invitecard_shared::store::UserStore;
use log::{debug, info};

use crate::error::{AppError, Result};
use crate::import::{apply_import, ImportSummary};
use crate::models::{
    normalize_email, CreateUserRequest, ImportRequest, OptionalField, UpdateUserRequest, UserQuery,
};
use crate::state::AppState;

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn valid_email(value: &str) -> Result<String> {
    required(value, "Email")?;
    normalize_email(value).ok_or_else(|| AppError::bad_request("Invalid email address".into()))
}

// GET /users?q=
pub async fn list_users<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<serde_json::Value>>
where
    S: UserStore,
{
    let users: Vec<User> = state
        .store
        .list_users()
        .await?
        .into_iter()
        .filter(|user| query.matches(user))
        .collect();
    debug!("Listing {} users", users.len());
    Ok(Json(serde_json::json!({ "users": users })))
}

// GET /users/:id
pub async fn get_user<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<User>>
where
    S: UserStore,
{
    Ok(Json(state.store.get_user(&id).await?))
}

// POST /users
pub async fn create_user<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)>
where
    S: UserStore,
{
    let name = required(&request.name, "Name")?;
    let email = valid_email(&request.email)?;

    let mut user = User::new(
        name,
        email,
        request.company_id.trim().to_string(),
        request.room_number.trim().to_string(),
    );
    user.access_level = request.access_level.unwrap_or_default();
    user.designation = request.designation;
    user.state = request.state;
    user.mobile_number = request.mobile_number;
    user.photo_url = request.photo_url;
    user.attendee_info = request.attendee_info;

    let user = state.store.create_user(user).await?;
    info!("Created user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

fn apply_field<T>(target: &mut Option<T>, field: Option<OptionalField<T>>) {
    if let Some(field) = field {
        *target = field.into_option();
    }
}

// PATCH /users/:id
pub async fn update_user<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>>
where
    S: UserStore,
{
    let mut user = state.store.get_user(&id).await?;

    if let Some(name) = request.name {
        user.name = required(&name, "Name")?;
    }
    if let Some(email) = request.email {
        user.email = valid_email(&email)?;
    }
    if let Some(company_id) = request.company_id {
        user.company_id = company_id.trim().to_string();
    }
    if let Some(room_number) = request.room_number {
        user.room_number = room_number.trim().to_string();
    }
    if let Some(access_level) = request.access_level {
        user.access_level = access_level;
    }
    apply_field(&mut user.designation, request.designation);
    apply_field(&mut user.state, request.state);
    apply_field(&mut user.mobile_number, request.mobile_number);
    apply_field(&mut user.photo_url, request.photo_url);
    apply_field(&mut user.attendee_info, request.attendee_info);
    user.updated_at = now_str();

    let user = state.store.update_user(user).await?;
    info!("Updated user {}", user.id);

    Ok(Json(user))
}

// DELETE /users/:id
pub async fn delete_user<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>>
where
    S: UserStore,
{
    if claims.sub == id {
        return Err(AppError::conflict(
            "You cannot delete your own account".into(),
        ));
    }

    state.store.delete_user(&id).await?;
    info!("Deleted user {}", id);

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// POST /users/import
pub async fn import_users<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportSummary>>
where
    S: UserStore,
{
    if request.users.is_empty() {
        return Err(AppError::bad_request("No rows to import".into()));
    }
    let summary = apply_import(state.store.as_ref(), request.users).await?;
    Ok(Json(summary))
}
