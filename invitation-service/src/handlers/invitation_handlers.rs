use axum::{
    extract::{Extension, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use invitecard_shared::auth::Claims;
use invitecard_shared::models::{now_str, AttendeeGroup, User};
use invitecard_shared::qr;
use invitecard_shared::store::UserStore;
use log::{debug, info};

use crate::error::Result;
use crate::models::{download_name, InvitationResponse, QrFormat, QrQuery};
use crate::state::AppState;

fn build_invitation<S>(state: &AppState<S>, user: User) -> Result<InvitationResponse> {
    let payload = state.codec.encode(&user)?;
    let png = qr::render_png(&payload, state.config.qr_size_px)?;
    debug!(
        "Rendered invitation for user {} ({} byte payload)",
        user.id,
        payload.len()
    );

    Ok(InvitationResponse {
        download_name: download_name(&user.name, QrFormat::Png),
        qr_code: qr::png_data_url(&png),
        payload,
        user,
    })
}

// GET /invitations/me
pub async fn my_invitation<S>(
    State(state): State<AppState<S>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<InvitationResponse>>
where
    S: UserStore,
{
    let user = state.store.get_user(&claims.sub).await?;
    Ok(Json(build_invitation(&state, user)?))
}

// GET /invitations/me/qr?format=png|svg
pub async fn my_invitation_qr<S>(
    State(state): State<AppState<S>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<QrQuery>,
) -> Result<Response>
where
    S: UserStore,
{
    let user = state.store.get_user(&claims.sub).await?;
    let payload = state.codec.encode(&user)?;
    let size = state.config.qr_size_px;

    let body = match query.format {
        QrFormat::Png => qr::render_png(&payload, size)?,
        QrFormat::Svg => qr::render_svg(&payload, size)?.into_bytes(),
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_name(&user.name, query.format)
    );

    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// PUT /invitations/me/attendees
// A `null` body clears the group.
pub async fn set_my_attendees<S>(
    State(state): State<AppState<S>>,
    Extension(claims): Extension<Claims>,
    Json(group): Json<Option<AttendeeGroup>>,
) -> Result<Json<InvitationResponse>>
where
    S: UserStore,
{
    let mut user = state.store.get_user(&claims.sub).await?;
    user.attendee_info = group;
    user.updated_at = now_str();
    let user = state.store.update_user(user).await?;

    info!("User {} updated attendee details", user.id);

    Ok(Json(build_invitation(&state, user)?))
}

// GET /users/:id/invitation
pub async fn user_invitation<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<InvitationResponse>>
where
    S: UserStore,
{
    let user = state.store.get_user(&id).await?;
    Ok(Json(build_invitation(&state, user)?))
}
