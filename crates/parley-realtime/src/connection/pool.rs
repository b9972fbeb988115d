//! Connection pool keyed by connection id.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::{ConnectionHandle, ConnectionId};

/// All live connection handles. Per-user lookups go through the presence
/// registry, which maps users to connection ids.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the pool
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Remove a connection, returning its handle if it was present
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(&id).map(|(_, handle)| handle)
    }

    /// Look up a connection by id
    pub fn get(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Snapshot of every live handle
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|r| Arc::clone(r.value())).collect()
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::UserId;
    use parley_entity::user::role::UserRole;
    use tokio::sync::mpsc;

    fn make_handle() -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ConnectionHandle::new(
            UserId::new(),
            UserRole::User,
            "bob".into(),
            tx,
        ))
    }

    #[test]
    fn add_get_remove() {
        let pool = ConnectionPool::new();
        let handle = make_handle();
        let id = handle.id;

        pool.add(Arc::clone(&handle));
        assert_eq!(pool.len(), 1);
        assert!(pool.get(id).is_some());

        let removed = pool.remove(id);
        assert!(removed.is_some());
        assert!(pool.is_empty());
        assert!(pool.remove(id).is_none());
    }
}
