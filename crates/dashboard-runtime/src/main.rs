//! # SupplyTrack Dashboard Runtime
//!
//! Entry point: load configuration, install logging, run until Ctrl+C.
//!
//! `RUST_LOG` takes precedence over `ST_LOG_LEVEL` for the log filter.

use anyhow::{anyhow, Context, Result};
use dashboard_runtime::{load_config, DashboardRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config();
    init_logging(&config.log_level)?;

    let runtime = DashboardRuntime::new(config).context("Failed to build dashboard runtime")?;
    runtime.start().await?;

    info!("Dashboard is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
