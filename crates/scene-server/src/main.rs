//! WebSocket scene hub binary.

use anyhow::Context;
use scene_server::config::Config;
use scene_server::server;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().context("read configuration")?;

    info!(
        addr = %config.socket_addr_string(),
        max_clients = config.max_clients,
        "starting scene-server"
    );

    server::run(config).await
}
