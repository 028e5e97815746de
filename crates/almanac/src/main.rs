//! Almanac service binary.

use std::path::PathBuf;

use anyhow::Context;

use almanac::{build_server, init_logging, AppConfig};

/// Environment variable naming the config file to load.
const ENV_CONFIG_FILE: &str = "ALMANAC_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(ENV_CONFIG_FILE).map(PathBuf::from);
    let config =
        AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        addr = %config.server.http_addr,
        "Starting almanac {}",
        env!("CARGO_PKG_VERSION")
    );

    let server = build_server(&config);
    server.run().await.context("Server exited with error")?;

    Ok(())
}
