use anyhow::Context;
use log::{info, warn};
use tokio::net::TcpListener;

mod config;
mod error;
mod handlers;
mod import;
mod models;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use config::ServiceConfig;
use routes::{create_router_with_state, in_memory_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    info!("Starting invitation service");
    if config.uses_default_jwt_secret() {
        warn!("INVITE_JWT_SECRET is not set, tokens are signed with the built-in default");
    }

    let bind_address = config.bind_address.clone();
    let prefix = config.route_prefix.clone();
    let state = in_memory_state(config);
    if state.codec.is_signed() {
        info!("Invitation payloads are signed");
    } else {
        warn!("INVITE_PAYLOAD_SIGNING_KEY is not set, scanned payloads are not authenticated");
    }
    let scanner = state.scanner.clone();
    let app = create_router_with_state(state, &prefix);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            scanner.cancel();
        })
        .await
        .context("server error")?;

    Ok(())
}
