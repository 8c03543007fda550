//! relayd - a minimal multi-client broadcast relay.
//!
//! Clients connect over TCP and send newline-delimited commands of the form
//! `<command>: <argument>`. The `broadcast` command fans its argument out to
//! every currently connected client. All shared state lives in the
//! [`state::Registry`]; each connection runs in its own Tokio task.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod proto;
pub mod state;
