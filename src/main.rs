//! rocket-aggregator — fleet telemetry aggregator
//!
//! Accepts per-rocket event envelopes over HTTP and serves the
//! reconstructed fleet state for read-only query. See the crate docs
//! (`lib.rs`) for the module map.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rocket_aggregator::api::{create_app, AppState};
use rocket_aggregator::config::{self, AggregatorConfig, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let aggregator_config = AggregatorConfig::from_args(&args)?;
    let addr = aggregator_config.addr;
    config::init(aggregator_config);

    info!("rocket-aggregator starting up");

    let app = create_app(AppState::new());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("rocket-aggregator shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal");
}
