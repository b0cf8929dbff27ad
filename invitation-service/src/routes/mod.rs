use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post, put},
    Router,
};
use invitecard_shared::auth::{auth_middleware, require_admin};
use invitecard_shared::store::{memory::InMemoryUserStore, UserStore};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::handlers::{
    auth_handlers::{login, me},
    invitation_handlers::{my_invitation, my_invitation_qr, set_my_attendees, user_invitation},
    scan_handlers::{cancel_scan, push_frame, scan_status, start_scan},
    user_handlers::{create_user, delete_user, get_user, import_users, list_users, update_user},
    verify_handlers::{verify_image, verify_payload},
};
use crate::state::AppState;

/// Builds the service state over the in-memory store
pub fn in_memory_state(config: ServiceConfig) -> AppState<InMemoryUserStore> {
    let store = if config.seed_demo_users {
        info!("Seeding in-memory store with demo users");
        InMemoryUserStore::with_demo_users()
    } else {
        InMemoryUserStore::new()
    };
    AppState::new(Arc::new(store), config)
}

/// Creates a router over the given state
pub fn create_router_with_state<S>(state: AppState<S>, prefix: &str) -> Router
where
    S: UserStore + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let keys = state.keys.clone();
    let store = Arc::clone(&state.store);
    let body_limit = state.config.max_upload_bytes;

    let public_routes = Router::new().route("/auth/login", post(login::<S>));

    // Any signed-in user
    let user_routes = Router::new()
        .route("/me", get(me::<S>))
        .route("/invitations/me", get(my_invitation::<S>))
        .route("/invitations/me/qr", get(my_invitation_qr::<S>))
        .route("/invitations/me/attendees", put(set_my_attendees::<S>))
        .layer(middleware::from_fn_with_state(keys.clone(), auth_middleware));

    // The last layer runs first: auth, then the admin check
    let admin_routes = Router::new()
        .route("/users", get(list_users::<S>).post(create_user::<S>))
        .route("/users/import", post(import_users::<S>))
        .route(
            "/users/:id",
            get(get_user::<S>)
                .patch(update_user::<S>)
                .delete(delete_user::<S>),
        )
        .route("/users/:id/invitation", get(user_invitation::<S>))
        .route("/verify", post(verify_payload::<S>))
        .route("/verify/image", post(verify_image::<S>))
        .route("/scanner", get(scan_status::<S>).delete(cancel_scan::<S>))
        .route("/scanner/start", post(start_scan::<S>))
        .route("/scanner/frames", post(push_frame::<S>))
        .layer(middleware::from_fn_with_state(store, require_admin::<S>))
        .layer(middleware::from_fn_with_state(keys, auth_middleware));

    let api_routes = public_routes
        .merge(user_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let router = if prefix.is_empty() {
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
