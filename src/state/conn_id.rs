//! Connection identifier generation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable unique identity for one client connection.
///
/// Assigned when the connection is accepted and never reused for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Generates unique connection identifiers from an atomic counter.
pub struct ConnIdGenerator {
    counter: AtomicU64,
}

/// Counter starts at 1 so that 0 never appears as a live identity.
const CONN_ID_START: u64 = 1;

impl ConnIdGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(CONN_ID_START),
        }
    }

    /// Generate the next unique connection id.
    pub fn next(&self) -> ConnId {
        ConnId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
