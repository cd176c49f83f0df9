mod config;
mod frame;
mod http;
mod models;
mod state;
mod upstream;

#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::upstream::StatsClient;
use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let stats_client = StatsClient::new(&config.upstream, config.stats.fields.clone())
        .context("Failed to initialize upstream stats client")?;
    info!(
        upstream = %config.upstream.url,
        fields = config.stats.fields.len(),
        "Upstream stats client ready"
    );

    let app_state =
        AppState::new(stats_client, config.frame.clone()).context("Failed to build frame state")?;

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("Moxie frame listening on {local_addr}");

    let router = http::router(app_state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
