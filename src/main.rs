//! Hacker Chess Move Bridge
//!
//! Serves moves from a native engine to the web client.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use hacker_chess_bridge::{BridgeServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Hacker Chess Bridge v{}", VERSION);

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    let server = BridgeServer::new(config);

    server.run().await.context("Server stopped")?;
    Ok(())
}
