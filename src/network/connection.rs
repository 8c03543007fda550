//! Connection - handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task. On start it registers its
//! outgoing queue in the Registry, then loops over two event sources with
//! `tokio::select!`: framed line reads from the socket, and queued outgoing
//! lines (its own replies plus fanout deliveries from other connections).
//! The loop ends on an explicit `quit` command or on any read/write
//! failure, and the task deregisters the connection exactly once on the
//! way out.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{self, Context, Dispatcher};
use crate::proto::{self, ParsedLine, MAX_LINE_LENGTH};
use crate::state::{ConnId, Registry};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, instrument, warn};

/// Outgoing queue depth per connection.
const OUTGOING_QUEUE_SIZE: usize = 32;

/// A client connection handler.
pub struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            stream,
            addr,
            registry,
            dispatcher,
        }
    }

    /// Run the connection loop until the client quits or I/O fails.
    #[instrument(skip(self), fields(addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            stream,
            addr: _,
            registry,
            dispatcher,
        } = self;
        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(
            read_half,
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );
        let mut writer = FramedWrite::new(
            write_half,
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(OUTGOING_QUEUE_SIZE);

        let id = registry.add(outgoing_tx.clone())?;
        info!(%id, connected = registry.len(), "Client connected");

        // Set when the quit handler has already deregistered the caller.
        let mut quit = false;

        loop {
            tokio::select! {
                result = reader.next() => {
                    match result {
                        Some(Ok(line)) => {
                            debug!(%id, raw = %line, "Received line");
                            match Self::handle_line(&registry, &dispatcher, id, &line, &outgoing_tx).await {
                                Ok(()) => {}
                                Err(HandlerError::Quit) => {
                                    // Flush the queued farewell before closing.
                                    while let Ok(msg) = outgoing_rx.try_recv() {
                                        if writer.send(msg).await.is_err() {
                                            break;
                                        }
                                    }
                                    quit = true;
                                    break;
                                }
                                Err(HandlerError::Send(e)) => {
                                    warn!(%id, error = %e, "Outgoing queue closed");
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            warn!(%id, error = %e, "Read error");
                            break;
                        }
                        None => {
                            info!(%id, "Client disconnected");
                            break;
                        }
                    }
                }

                Some(msg) = outgoing_rx.recv() => {
                    if let Err(e) = writer.send(msg).await {
                        warn!(%id, error = %e, "Write error");
                        break;
                    }
                }
            }
        }

        if !quit {
            match registry.remove(id) {
                Ok(_) => info!(%id, remaining = registry.len(), "Client deregistered"),
                // A second removal means the lifecycle tracking broke
                // somewhere; the registry itself stays consistent.
                Err(e) => warn!(%id, error = %e, "Deregistration failed"),
            }
        }

        Ok(())
    }

    /// Parse one received line and dispatch it.
    ///
    /// Parse failures are reported to the caller and the connection stays
    /// open; only queue loss and quit propagate to the loop.
    async fn handle_line(
        registry: &Arc<Registry>,
        dispatcher: &Dispatcher,
        id: ConnId,
        line: &str,
        outgoing_tx: &mpsc::Sender<String>,
    ) -> HandlerResult {
        match proto::parse_line(line) {
            Ok(ParsedLine::Empty) => {
                debug!(%id, "Empty line received");
                outgoing_tx.send(String::new()).await?;
                Ok(())
            }
            Ok(ParsedLine::Command { name, argument }) => {
                let ctx = Context {
                    id,
                    registry,
                    sender: outgoing_tx,
                };
                dispatcher.dispatch(&ctx, &name, &argument).await
            }
            Err(e) => {
                debug!(%id, error = %e, "Malformed line");
                outgoing_tx.send(handlers::err_cannot_parse()).await?;
                Ok(())
            }
        }
    }
}
