//! A single chat room's in-memory state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::connection::handle::ConnectionId;

/// Connections currently joined to one chat.
#[derive(Debug)]
pub struct Room {
    members: HashSet<ConnectionId>,
    created_at: DateTime<Utc>,
}

impl Room {
    /// Create an empty room
    pub fn new() -> Self {
        Self {
            members: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a member. Returns `false` if it was already joined.
    pub fn join(&mut self, connection_id: ConnectionId) -> bool {
        self.members.insert(connection_id)
    }

    /// Remove a member. Returns `false` if it was not joined.
    pub fn leave(&mut self, connection_id: ConnectionId) -> bool {
        self.members.remove(&connection_id)
    }

    /// Whether the connection is joined
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.members.contains(&connection_id)
    }

    /// Iterate over current members
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    /// Member count
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the room has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// When the room was first created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}
