//! Listen address configuration — the only externally configurable input
//! (§6: "listen host and port are the only externally configurable
//! inputs"). No persisted state.
//!
//! Loading order: CLI flag, then environment variable, then a built-in
//! default.

use std::net::SocketAddr;
use std::sync::OnceLock;

use clap::Parser;

const DEFAULT_ADDR: &str = "0.0.0.0:8088";

#[derive(Parser, Debug, Clone)]
#[command(name = "rocket-aggregator")]
#[command(about = "Fleet telemetry aggregator for in-flight rockets")]
#[command(version)]
pub struct CliArgs {
    /// Address to listen on (overrides `ROCKET_AGGREGATOR_ADDR` and the
    /// built-in default).
    #[arg(long, env = "ROCKET_AGGREGATOR_ADDR")]
    pub addr: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub addr: SocketAddr,
}

impl AggregatorConfig {
    /// Resolve from CLI args (env-layered by clap already), falling back to
    /// the built-in default address.
    pub fn from_args(args: &CliArgs) -> anyhow::Result<Self> {
        let raw = args.addr.clone().unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw.parse().map_err(|e| {
            anyhow::anyhow!("invalid listen address {raw:?}: {e}")
        })?;
        Ok(Self { addr })
    }
}

static CONFIG: OnceLock<AggregatorConfig> = OnceLock::new();

/// Initialize the global configuration. Must be called exactly once at
/// startup.
pub fn init(config: AggregatorConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get the global configuration.
///
/// Panics if `init()` has not been called — a missing config is a fatal
/// startup error, not a recoverable condition.
pub fn get() -> &'static AggregatorConfig {
    CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}
