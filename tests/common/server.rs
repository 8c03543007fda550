//! Test server management.
//!
//! Runs an in-process relayd gateway on an ephemeral port for integration
//! testing.

use relayd::handlers::Dispatcher;
use relayd::network::Gateway;
use relayd::state::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<Registry>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a new test server on an ephemeral local port.
    pub async fn spawn() -> anyhow::Result<Self> {
        let registry = Arc::new(Registry::new());
        let dispatcher = Arc::new(Dispatcher::new());

        let gateway = Gateway::bind(
            "127.0.0.1:0".parse().expect("valid loopback address"),
            10,
            Arc::clone(&registry),
            dispatcher,
        )
        .await?;
        let addr = gateway.local_addr()?;

        let handle = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self {
            addr,
            registry,
            handle,
        })
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Number of connections currently registered.
    #[allow(dead_code)]
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Create a new test client connected to this server.
    #[allow(dead_code)]
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
