//! Connection lifecycle handlers.
//!
//! Handles the `quit` and `nick` commands.

use super::{helpers, Context, Handler};
use crate::error::{HandlerError, HandlerResult, RegistryError};
use async_trait::async_trait;
use tracing::{info, warn};

/// Handler for the `quit` command.
///
/// Removes the caller from the registry first, then broadcasts the
/// departure notice, so the quitter never receives its own notice. The
/// final `Bye!` goes to the caller alone, and [`HandlerError::Quit`] tells
/// the connection loop to terminate.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    // Argument is part of the wire grammar but unused.
    async fn handle(&self, ctx: &Context<'_>, _argument: &str) -> HandlerResult {
        let label = ctx.registry.label(ctx.id);

        match ctx.registry.remove(ctx.id) {
            Ok(_) => info!(id = %ctx.id, label = %label, "Client quit"),
            Err(e) => warn!(id = %ctx.id, error = %e, "Quit for unregistered connection"),
        }

        helpers::fanout(ctx.registry, &helpers::departure_notice(&label)).await;
        ctx.sender.send("Bye!".to_string()).await?;

        Err(HandlerError::Quit)
    }
}

/// Handler for the `nick` command.
///
/// Binds a nickname to the calling connection; the name then serves as the
/// caller's display label. Conflicts are reported to the caller only.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &Context<'_>, argument: &str) -> HandlerResult {
        if argument.is_empty() {
            ctx.sender
                .send("ERROR: Nickname must not be empty".to_string())
                .await?;
            return Ok(());
        }

        match ctx.registry.set_nickname(ctx.id, argument) {
            Ok(()) => {
                info!(id = %ctx.id, nick = %argument, "Nick set");
                ctx.sender
                    .send(format!("OK: nick set to \"{argument}\""))
                    .await?;
            }
            Err(RegistryError::NicknameTaken(name)) => {
                ctx.sender.send(helpers::err_nickname_in_use(&name)).await?;
            }
            Err(e) => {
                // NotFound here means the caller raced its own teardown.
                warn!(id = %ctx.id, error = %e, "Nick set failed");
            }
        }

        Ok(())
    }
}
