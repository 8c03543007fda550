//! Reply constructors and the broadcast fanout primitive shared by handlers.

use crate::state::Registry;
use tracing::debug;

/// Usage error for a line with no delimiter.
pub fn err_cannot_parse() -> String {
    "ERROR: Cannot parse command. Please write the command in \
\"COMMAND: argument1 argument2\" form"
        .to_string()
}

/// Error reply for a command name not in the dispatch map.
pub fn err_unknown_command(name: &str) -> String {
    format!("ERROR: Unknown command \"{name}\"")
}

/// Error reply for a nickname already bound to another connection.
pub fn err_nickname_in_use(name: &str) -> String {
    format!("ERROR: Nickname \"{name}\" is already in use")
}

/// System-origin notice broadcast when a client leaves.
pub fn departure_notice(label: &str) -> String {
    format!("<broadcast: SYSTEM>: {label} has left the chat")
}

/// Deliver one line to every connection currently in the registry.
///
/// Takes a snapshot so no lock is held during the sends. A failure to reach
/// one recipient is isolated: it is logged and skipped, and delivery to the
/// remaining recipients continues.
pub async fn fanout(registry: &Registry, line: &str) {
    for record in registry.snapshot() {
        if let Err(e) = record.sender.send(line.to_string()).await {
            debug!(id = %record.id, error = %e, "Recipient unreachable, skipping");
        }
    }
}
