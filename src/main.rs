use std::net::SocketAddr;

use anyhow::{Context, Result};
use storefront_gate::config::Config;
use storefront_gate::server::{build_router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront_gate=info".parse()?),
        )
        .init();

    info!("Starting storefront gate");

    // Load configuration from environment
    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    info!("Forwarding gated traffic to {}", config.upstream_url);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Storefront gate stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
