//! Messaging handlers.

use super::{helpers, Context, Handler};
use crate::error::HandlerResult;
use async_trait::async_trait;
use tracing::debug;

/// Handler for the `broadcast` command.
///
/// Sends the argument verbatim, newline-terminated, to every connection in
/// the current registry snapshot, including the sender. No separate
/// acknowledgement beyond what the fanout itself delivers.
pub struct BroadcastHandler;

#[async_trait]
impl Handler for BroadcastHandler {
    async fn handle(&self, ctx: &Context<'_>, argument: &str) -> HandlerResult {
        debug!(id = %ctx.id, recipients = ctx.registry.len(), "Broadcast");
        helpers::fanout(ctx.registry, argument).await;
        Ok(())
    }
}
