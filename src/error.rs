//! Unified error handling for relayd.
//!
//! Each fallible boundary gets its own error type: the parser reports
//! [`ParseError`], the registry [`RegistryError`], and command handlers
//! [`HandlerError`]. A failure in one connection's handling never crosses
//! over to another connection or to the acceptor.

use crate::state::ConnId;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors produced when parsing one received line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The line carried no `:` delimiter and cannot be split into a
    /// command and argument.
    #[error("cannot parse command: no delimiter in line")]
    MalformedCommand,
}

/// Errors produced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A freshly generated id was already present. Indicates a generator
    /// bug; must not happen under correct use.
    #[error("connection id {0} already registered")]
    DuplicateId(ConnId),

    /// The id is not (or no longer) registered. On the removal path this
    /// signals a lifecycle bug in the caller.
    #[error("connection id {0} not registered")]
    NotFound(ConnId),

    /// The nickname is already bound to a different connection.
    #[error("nickname {0:?} is already in use")]
    NicknameTaken(String),
}

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The client asked to quit; the connection loop terminates cleanly.
    #[error("client quit")]
    Quit,

    /// The caller's outgoing queue is gone; treated as connection I/O
    /// failure and fatal to this connection only.
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<String>),
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
