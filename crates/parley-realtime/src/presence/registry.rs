//! Presence registry mapping users to their live connections.
//!
//! A user is online while they have at least one connection. The registry
//! reports the edge transitions: `add_connection` returns `true` only for
//! the connection that took the user from zero to one, and
//! `remove_connection` returns `true` only for the removal that took them
//! back to zero. Both are atomic per user, so concurrent connects and
//! disconnects from the same user produce exactly one of each transition.

use std::collections::HashSet;

use dashmap::DashMap;

use parley_core::types::UserId;

use crate::connection::handle::ConnectionId;

/// Tracks online users and their connection ids.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    online: DashMap<UserId, HashSet<ConnectionId>>,
}

impl PresenceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection for a user. Returns `true` if this is the
    /// user's first live connection (the offline-to-online edge).
    pub fn add_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let mut entry = self.online.entry(user_id).or_default();
        let was_offline = entry.is_empty();
        entry.insert(connection_id);
        was_offline
    }

    /// Drop a connection for a user. Returns `true` if this was the
    /// user's last live connection (the online-to-offline edge). Removing
    /// a connection that was never recorded returns `false`.
    pub fn remove_connection(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let now_offline = match self.online.get_mut(&user_id) {
            Some(mut entry) => entry.remove(&connection_id) && entry.is_empty(),
            None => false,
        };

        if now_offline {
            // Reap the empty set. remove_if re-checks under the shard
            // lock, so a connect racing in between keeps its entry.
            self.online.remove_if(&user_id, |_, conns| conns.is_empty());
        }

        now_offline
    }

    /// Whether the user has at least one live connection
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online
            .get(&user_id)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// Snapshot of a user's connection ids
    pub fn connections_of(&self, user_id: UserId) -> Vec<ConnectionId> {
        self.online
            .get(&user_id)
            .map(|conns| conns.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of all online user ids
    pub fn online_users(&self) -> Vec<UserId> {
        self.online
            .iter()
            .filter(|r| !r.value().is_empty())
            .map(|r| *r.key())
            .collect()
    }

    /// Number of online users
    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[test]
    fn first_connection_reports_online_edge() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();

        assert!(registry.add_connection(user, Uuid::new_v4()));
        assert!(!registry.add_connection(user, Uuid::new_v4()));
        assert!(registry.is_online(user));
    }

    #[test]
    fn last_removal_reports_offline_edge() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        registry.add_connection(user, first);
        registry.add_connection(user, second);

        assert!(!registry.remove_connection(user, first));
        assert!(registry.is_online(user));
        assert!(registry.remove_connection(user, second));
        assert!(!registry.is_online(user));
    }

    #[test]
    fn removing_unknown_connection_is_not_an_offline_edge() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();

        assert!(!registry.remove_connection(user, Uuid::new_v4()));

        registry.add_connection(user, Uuid::new_v4());
        assert!(!registry.remove_connection(user, Uuid::new_v4()));
        assert!(registry.is_online(user));
    }

    #[test]
    fn reconnect_after_offline_reports_online_again() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();
        let conn = Uuid::new_v4();

        assert!(registry.add_connection(user, conn));
        assert!(registry.remove_connection(user, conn));
        assert!(registry.add_connection(user, Uuid::new_v4()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_connects_produce_one_online_edge() {
        let registry = Arc::new(PresenceRegistry::new());
        let user = UserId::new();
        let online_edges = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let online_edges = Arc::clone(&online_edges);
            tasks.push(tokio::spawn(async move {
                if registry.add_connection(user, Uuid::new_v4()) {
                    online_edges.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(online_edges.load(Ordering::SeqCst), 1);
        assert_eq!(registry.connections_of(user).len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_disconnects_produce_one_offline_edge() {
        let registry = Arc::new(PresenceRegistry::new());
        let user = UserId::new();
        let conns: Vec<_> = (0..16).map(|_| Uuid::new_v4()).collect();
        for &conn in &conns {
            registry.add_connection(user, conn);
        }

        let offline_edges = Arc::new(AtomicUsize::new(0));
        let mut tasks = Vec::new();
        for conn in conns {
            let registry = Arc::clone(&registry);
            let offline_edges = Arc::clone(&offline_edges);
            tasks.push(tokio::spawn(async move {
                if registry.remove_connection(user, conn) {
                    offline_edges.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(offline_edges.load(Ordering::SeqCst), 1);
        assert!(!registry.is_online(user));
    }
}
