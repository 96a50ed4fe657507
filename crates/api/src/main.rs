//! Drowsiness Monitoring Server - Main Entry Point

use api::config::AppConfig;
use api::{init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        sleep = config.dms.sleep_ear_threshold,
        active = config.dms.active_ear_threshold,
        run_length = config.dms.category_run_length,
        "Drowsiness thresholds"
    );

    run_server(config).await?;

    Ok(())
}
