//! Shared harness for integration tests.

pub mod client;
pub mod server;

pub use client::TestClient;
pub use server::TestServer;

use std::time::Duration;

/// Wait until the server has registered exactly `expected` connections.
///
/// Registration happens in the spawned connection task, so a client's
/// connect returning does not yet mean the registry saw it.
#[allow(dead_code)]
pub async fn wait_for_connections(server: &TestServer, expected: usize) {
    for _ in 0..100 {
        if server.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} connections, server has {}",
        expected,
        server.connection_count()
    );
}
