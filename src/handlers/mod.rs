//! Command handlers.
//!
//! This module contains the Handler trait and the command Dispatcher that
//! maps a parsed command name to behavior. The dispatch table is an
//! explicit, closed map built once at startup: internal primitives (the
//! fanout helper, the dispatch entry point, the raw-send queue) are simply
//! not in the map, so a client naming them gets the same unknown-command
//! reply as any other unregistered name.

mod connection;
mod helpers;
mod messaging;

pub use connection::{NickHandler, QuitHandler};
pub use helpers::{
    departure_notice, err_cannot_parse, err_nickname_in_use, err_unknown_command, fanout,
};
pub use messaging::BroadcastHandler;

use crate::error::HandlerResult;
use crate::state::{ConnId, Registry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Identity of the calling connection.
    pub id: ConnId,
    /// Shared connection registry.
    pub registry: &'a Arc<Registry>,
    /// Outgoing queue of the calling connection, for unicast replies.
    pub sender: &'a mpsc::Sender<String>,
}

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one command with its argument text.
    async fn handle(&self, ctx: &Context<'_>, argument: &str) -> HandlerResult;
}

/// Closed registry of command handlers, keyed by canonical command name.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Create a new dispatcher with all built-in commands registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert("broadcast", Box::new(BroadcastHandler));
        handlers.insert("quit", Box::new(QuitHandler));
        handlers.insert("nick", Box::new(NickHandler));

        Self { handlers }
    }

    /// Dispatch a parsed command to its handler.
    ///
    /// Unknown names get an error reply unicast to the caller and are never
    /// broadcast; the connection stays open.
    pub async fn dispatch(
        &self,
        ctx: &Context<'_>,
        name: &str,
        argument: &str,
    ) -> HandlerResult {
        match self.handlers.get(name) {
            Some(handler) => handler.handle(ctx, argument).await,
            None => {
                ctx.sender.send(err_unknown_command(name)).await?;
                Ok(())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
