//! The `examscore serve` command.

use std::path::PathBuf;

use anyhow::Result;

use examscore_remote::config::load_config_from;
use examscore_remote::build_engine;
use examscore_server::AppState;

pub async fn execute(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let engine = build_engine(&config)?;
    tracing::info!(service = "examscore", "starting");

    examscore_server::serve(&config.server.bind_addr(), AppState::new(engine)).await
}
