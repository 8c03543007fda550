//! relayd - a minimal multi-client broadcast relay.

use relayd::config::Config;
use relayd::handlers::Dispatcher;
use relayd::network::Gateway;
use relayd::state::Registry;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(port) = args.next() else {
        eprintln!("ERROR: Please provide a port to bind");
        eprintln!("Usage: relayd <port> [config.toml]");
        std::process::exit(1);
    };
    let port: u16 = port
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid port {port:?}: {e}"))?;

    let config = match args.next() {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };

    info!(server = %config.server.name, port, "Starting relayd");

    let registry = Arc::new(Registry::new());
    let dispatcher = Arc::new(Dispatcher::new());

    let gateway = Gateway::bind(
        config.listen.socket_addr(port),
        config.listen.backlog,
        registry,
        dispatcher,
    )
    .await?;

    tokio::select! {
        result = gateway.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received. Shutting down");
            Ok(())
        }
    }
}
