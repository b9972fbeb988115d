//! Room registry: chat id → room, plus a reverse index for fast cleanup
//! when a connection drops.

use std::collections::HashSet;

use dashmap::DashMap;

use parley_core::types::ChatId;

use super::room::Room;
use crate::connection::handle::ConnectionId;

/// All active rooms and which rooms each connection has joined.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<ChatId, Room>,
    joined: DashMap<ConnectionId, HashSet<ChatId>>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a connection to a chat's room, creating the room on first
    /// join. Joining twice is a no-op.
    pub fn join(&self, chat_id: ChatId, connection_id: ConnectionId) -> bool {
        let added = self.rooms.entry(chat_id).or_default().join(connection_id);
        if added {
            self.joined.entry(connection_id).or_default().insert(chat_id);
        }
        added
    }

    /// Remove a connection from a room, reaping the room when it empties.
    pub fn leave(&self, chat_id: ChatId, connection_id: ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(&chat_id) {
            Some(mut room) => room.leave(connection_id),
            None => false,
        };

        if removed {
            self.rooms.remove_if(&chat_id, |_, room| room.is_empty());
            if let Some(mut chats) = self.joined.get_mut(&connection_id) {
                chats.remove(&chat_id);
            }
        }

        removed
    }

    /// Remove a connection from every room it joined. Used on disconnect.
    pub fn leave_all(&self, connection_id: ConnectionId) -> usize {
        let chats = match self.joined.remove(&connection_id) {
            Some((_, chats)) => chats,
            None => return 0,
        };

        let mut left = 0;
        for chat_id in chats {
            if let Some(mut room) = self.rooms.get_mut(&chat_id) {
                if room.leave(connection_id) {
                    left += 1;
                }
            }
            self.rooms.remove_if(&chat_id, |_, room| room.is_empty());
        }
        left
    }

    /// Run `f` for every member of a room while holding the room's write
    /// guard. Fan-outs to the same room are serialized against each other
    /// and against joins and leaves, so every member sees broadcasts in
    /// the same order and each broadcast sees a consistent membership
    /// snapshot. `f` must not block; sends go through non-blocking
    /// channels.
    pub fn for_each_member<F>(&self, chat_id: ChatId, mut f: F)
    where
        F: FnMut(ConnectionId),
    {
        if let Some(room) = self.rooms.get_mut(&chat_id) {
            for member in room.members() {
                f(member);
            }
        }
    }

    /// Whether a connection is joined to a chat's room
    pub fn is_member(&self, chat_id: ChatId, connection_id: ConnectionId) -> bool {
        self.rooms
            .get(&chat_id)
            .map(|room| room.contains(connection_id))
            .unwrap_or(false)
    }

    /// Snapshot of a room's members
    pub fn members(&self, chat_id: ChatId) -> Vec<ConnectionId> {
        self.rooms
            .get(&chat_id)
            .map(|room| room.members().collect())
            .unwrap_or_default()
    }

    /// How many rooms a connection has joined
    pub fn joined_count(&self, connection_id: ConnectionId) -> usize {
        self.joined
            .get(&connection_id)
            .map(|chats| chats.len())
            .unwrap_or(0)
    }

    /// Number of active rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn join_and_leave() {
        let registry = RoomRegistry::new();
        let chat = ChatId::new();
        let conn = Uuid::new_v4();

        assert!(registry.join(chat, conn));
        assert!(!registry.join(chat, conn));
        assert!(registry.is_member(chat, conn));
        assert_eq!(registry.joined_count(conn), 1);

        assert!(registry.leave(chat, conn));
        assert!(!registry.leave(chat, conn));
        assert!(!registry.is_member(chat, conn));
        assert_eq!(registry.joined_count(conn), 0);
    }

    #[test]
    fn empty_rooms_are_reaped() {
        let registry = RoomRegistry::new();
        let chat = ChatId::new();
        let conn = Uuid::new_v4();

        registry.join(chat, conn);
        assert_eq!(registry.room_count(), 1);
        registry.leave(chat, conn);
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn leave_all_clears_every_room() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();
        let chats: Vec<_> = (0..3).map(|_| ChatId::new()).collect();

        for &chat in &chats {
            registry.join(chat, conn);
        }
        registry.join(chats[0], other);

        assert_eq!(registry.leave_all(conn), 3);
        assert_eq!(registry.joined_count(conn), 0);
        // The shared room survives with its other member.
        assert_eq!(registry.members(chats[0]), vec![other]);
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn fan_out_visits_only_members() {
        let registry = RoomRegistry::new();
        let chat = ChatId::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        registry.join(chat, a);
        registry.join(chat, b);
        registry.join(ChatId::new(), Uuid::new_v4());

        let mut seen = Vec::new();
        registry.for_each_member(chat, |id| seen.push(id));
        seen.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(seen, expected);
    }
}
