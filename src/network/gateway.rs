//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds a listening socket and spawns one Connection task per
//! incoming client. An accept failure is logged and the loop continues;
//! only an operator interrupt (handled in `main`) stops accepting.

use crate::handlers::Dispatcher;
use crate::network::Connection;
use crate::state::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    /// Bind the gateway to the specified address with the given accept
    /// backlog.
    pub async fn bind(
        addr: SocketAddr,
        backlog: u32,
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
    ) -> anyhow::Result<Self> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(backlog)?;
        info!(%addr, backlog, "Listener bound");

        Ok(Self {
            listener,
            registry,
            dispatcher,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(%addr, "Connection accepted");

                    let registry = Arc::clone(&self.registry);
                    let dispatcher = Arc::clone(&self.dispatcher);

                    tokio::spawn(async move {
                        let connection = Connection::new(stream, addr, registry, dispatcher);
                        if let Err(e) = connection.run().await {
                            error!(%addr, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
