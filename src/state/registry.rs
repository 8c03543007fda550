//! The Registry - central shared state for the relay.
//!
//! The Registry maps live connection identities to per-connection records
//! and keeps a secondary nickname index in sync with the primary map. Both
//! maps live behind a single lock so that a mutation can never leave the
//! secondary index pointing at a dead record, and so that a snapshot never
//! observes a half-applied update.
//!
//! Broadcast never holds the lock across network sends: `snapshot` copies
//! the records out under the read lock and the actual sends happen outside.

use crate::error::RegistryError;
use crate::state::{ConnId, ConnIdGenerator};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Per-connection state held by the Registry.
///
/// The `sender` is the routing handle to the connection's outgoing queue;
/// the connection task owns the socket itself.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    /// Stable identity of the connection.
    pub id: ConnId,
    /// Outgoing line queue for this connection.
    pub sender: mpsc::Sender<String>,
    /// Nickname, if the client set one.
    pub nickname: Option<String>,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<ConnId, ConnectionRecord>,
    by_nick: HashMap<String, ConnId>,
}

/// The shared mapping from live connections to their metadata.
pub struct Registry {
    inner: RwLock<Inner>,
    id_gen: ConnIdGenerator,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            id_gen: ConnIdGenerator::new(),
        }
    }

    /// Register a new connection and return its freshly derived identity.
    ///
    /// Fails with [`RegistryError::DuplicateId`] only if the generated id is
    /// already present, which indicates a generator bug rather than a
    /// caller error.
    pub fn add(&self, sender: mpsc::Sender<String>) -> Result<ConnId, RegistryError> {
        let id = self.id_gen.next();
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        inner.by_id.insert(
            id,
            ConnectionRecord {
                id,
                sender,
                nickname: None,
            },
        );
        Ok(id)
    }

    /// Remove a connection and any nickname binding it held.
    ///
    /// Returns [`RegistryError::NotFound`] for an already-removed id. That
    /// signals a lifecycle bug in the caller; the registry itself stays
    /// consistent either way.
    pub fn remove(&self, id: ConnId) -> Result<ConnectionRecord, RegistryError> {
        let mut inner = self.inner.write();
        let record = inner
            .by_id
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if let Some(nick) = &record.nickname {
            inner.by_nick.remove(nick);
        }
        Ok(record)
    }

    /// Look up a connection's record by id.
    pub fn get(&self, id: ConnId) -> Option<ConnectionRecord> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Bind a nickname to a connection.
    ///
    /// Fails with [`RegistryError::NicknameTaken`] if the name is already
    /// bound to a different id. Any prior nickname held by `id` is released
    /// in the same critical section, so the secondary index never dangles.
    pub fn set_nickname(&self, id: ConnId, name: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();

        if let Some(owner) = inner.by_nick.get(name) {
            if *owner != id {
                return Err(RegistryError::NicknameTaken(name.to_string()));
            }
            // Re-setting one's own current nickname is a no-op.
            return Ok(());
        }

        let record = inner
            .by_id
            .get(&id)
            .ok_or(RegistryError::NotFound(id))?;
        let old_nick = record.nickname.clone();

        if let Some(old) = old_nick {
            inner.by_nick.remove(&old);
        }
        inner.by_nick.insert(name.to_string(), id);
        // Checked present above; the write lock is still held.
        if let Some(record) = inner.by_id.get_mut(&id) {
            record.nickname = Some(name.to_string());
        }
        Ok(())
    }

    /// Display label for a connection: its nickname if set, else its id.
    pub fn label(&self, id: ConnId) -> String {
        let inner = self.inner.read();
        inner
            .by_id
            .get(&id)
            .and_then(|r| r.nickname.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Point-in-time copy of all live records, ordered by id.
    ///
    /// Safe to iterate while other tasks add and remove connections; the
    /// caller sends to the copied handles outside any lock.
    pub fn snapshot(&self) -> Vec<ConnectionRecord> {
        let mut records: Vec<ConnectionRecord> =
            self.inner.read().by_id.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Whether the registry holds no connections.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_id.is_empty()
    }

    /// Whether the given id is currently registered.
    pub fn contains(&self, id: ConnId) -> bool {
        self.inner.read().by_id.contains_key(&id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sender() -> mpsc::Sender<String> {
        let (tx, _rx) = mpsc::channel(1);
        tx
    }

    #[test]
    fn add_get_remove() {
        let registry = Registry::new();
        let id = registry.add(sender()).unwrap();

        let record = registry.get(id).expect("record present after add");
        assert_eq!(record.id, id);
        assert!(record.nickname.is_none());
        assert_eq!(registry.len(), 1);

        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.is_empty());
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn double_remove_reports_not_found() {
        let registry = Registry::new();
        let id = registry.add(sender()).unwrap();
        registry.remove(id).unwrap();

        match registry.remove(id) {
            Err(RegistryError::NotFound(missing)) => assert_eq!(missing, id),
            other => panic!("expected NotFound, got {:?}", other.map(|r| r.id)),
        }
        // State stays consistent after the lifecycle bug signal.
        assert!(registry.is_empty());
    }

    #[test]
    fn nickname_binding_and_conflict() {
        let registry = Registry::new();
        let alice = registry.add(sender()).unwrap();
        let bob = registry.add(sender()).unwrap();

        registry.set_nickname(alice, "alice").unwrap();
        assert_eq!(registry.label(alice), "alice");

        // Conflict with a different id.
        match registry.set_nickname(bob, "alice") {
            Err(RegistryError::NicknameTaken(name)) => assert_eq!(name, "alice"),
            other => panic!("expected NicknameTaken, got {other:?}"),
        }

        // Re-setting one's own nickname is fine.
        registry.set_nickname(alice, "alice").unwrap();

        // Rebinding releases the old name for others.
        registry.set_nickname(alice, "al").unwrap();
        registry.set_nickname(bob, "alice").unwrap();
        assert_eq!(registry.label(bob), "alice");
    }

    #[test]
    fn remove_releases_nickname() {
        let registry = Registry::new();
        let alice = registry.add(sender()).unwrap();
        registry.set_nickname(alice, "alice").unwrap();
        registry.remove(alice).unwrap();

        let bob = registry.add(sender()).unwrap();
        registry.set_nickname(bob, "alice").unwrap();
        assert_eq!(registry.label(bob), "alice");
    }

    #[test]
    fn label_falls_back_to_id() {
        let registry = Registry::new();
        let id = registry.add(sender()).unwrap();
        assert_eq!(registry.label(id), id.to_string());
        // Unknown id still renders something usable for logs.
        let ghost = registry.add(sender()).unwrap();
        registry.remove(ghost).unwrap();
        assert_eq!(registry.label(ghost), ghost.to_string());
    }

    #[test]
    fn snapshot_is_ordered_copy() {
        let registry = Registry::new();
        let a = registry.add(sender()).unwrap();
        let b = registry.add(sender()).unwrap();
        let c = registry.add(sender()).unwrap();
        registry.remove(b).unwrap();

        let snap = registry.snapshot();
        let ids: Vec<ConnId> = snap.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, c]);

        // Mutations after the snapshot do not affect the copy.
        registry.remove(a).unwrap();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn concurrent_add_remove_leaves_consistent_state() {
        let registry = Arc::new(Registry::new());
        let mut handles = Vec::new();

        // Each worker adds 50 connections and removes every other one,
        // while another thread takes snapshots throughout.
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                let mut kept = 0usize;
                for i in 0..50 {
                    let id = registry.add(sender()).unwrap();
                    if i % 2 == 0 {
                        registry.remove(id).unwrap();
                    } else {
                        kept += 1;
                    }
                }
                kept
            }));
        }

        let snapshotter = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let snap = registry.snapshot();
                    // Snapshot ids are strictly ordered, so no duplicates
                    // even while other threads mutate.
                    for pair in snap.windows(2) {
                        assert!(pair[0].id < pair[1].id);
                    }
                }
            })
        };

        let expected: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        snapshotter.join().unwrap();

        assert_eq!(registry.len(), expected);

        // No duplicate or dangling entries.
        let snap = registry.snapshot();
        assert_eq!(snap.len(), expected);
        let mut ids: Vec<ConnId> = snap.iter().map(|r| r.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), expected);
    }
}
