//! State management module.
//!
//! Contains the connection Registry (shared server state) and related types.

mod conn_id;
mod registry;

pub use conn_id::{ConnId, ConnIdGenerator};
pub use registry::{ConnectionRecord, Registry};
