//! Reporter gateway binary.
//!
//! Reads `.env` when present, then configuration from the environment.
//! See `GatewayConfig::from_env` and `ReporterConfig::from_env` for the
//! variables.

use anyhow::{Context, Result};
use chainhook_reporter::ReporterConfig;
use reporter_gateway::{init_tracing, GatewayConfig, GatewayService, VERSION};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    init_tracing(&config.log).context("failed to initialize tracing")?;

    let reporter = ReporterConfig::from_env().context("invalid reporter configuration")?;

    info!(version = VERSION, "Starting reporter gateway");
    GatewayService::new(config, reporter)?.start().await?;

    Ok(())
}
