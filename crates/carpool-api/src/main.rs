//! BanuPool API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p carpool-api
//! ```
//!
//! Configuration is loaded from environment variables and `.env`.

use anyhow::Context;
use carpool_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let tracing_config = if config.app.env.is_production() {
        TracingConfig::production()
    } else {
        TracingConfig::development()
    };
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        backend = ?config.database.backend,
        port = config.api.port,
        "Configuration loaded"
    );

    carpool_api::run(config).await.context("Server failed")?;

    Ok(())
}
