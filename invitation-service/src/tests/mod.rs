mod auth_handlers_test;
mod scan_handlers_test;
mod user_handlers_test;

use axum::Router;
use invitecard_shared::models::{demo_users, User};
use invitecard_shared::store::memory::InMemoryUserStore;
use invitecard_shared::test_utils::test_logging::init_test_logging;

use crate::config::ServiceConfig;
use crate::routes::{create_router_with_state, in_memory_state};
use crate::state::AppState;

pub(crate) fn test_config() -> ServiceConfig {
    ServiceConfig {
        jwt_secret: "test-jwt-secret".to_string(),
        scan_poll_interval_ms: 10,
        scan_timeout_secs: 1,
        ..ServiceConfig::default()
    }
}

/// Router over the demo users, plus the state behind it.
pub(crate) fn create_test_app_with(
    config: ServiceConfig,
) -> (Router, AppState<InMemoryUserStore>) {
    init_test_logging();
    let state = in_memory_state(config);
    let router = create_router_with_state(state.clone(), "");
    (router, state)
}

pub(crate) fn create_test_app() -> (Router, AppState<InMemoryUserStore>) {
    create_test_app_with(test_config())
}

pub(crate) fn admin() -> User {
    demo_users().remove(0)
}

pub(crate) fn jane() -> User {
    demo_users().remove(2)
}
