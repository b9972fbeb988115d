//! Connection manager and event router.
//!
//! Owns the connection pool, presence registry, and room registry; routes
//! inbound client events and fans out outbound broadcasts. Malformed or
//! unauthorized inbound events are logged and dropped, never fatal to the
//! connection.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use parley_core::config::realtime::RealtimeConfig;
use parley_core::types::{ChatId, MessageId, UserId};
use parley_entity::message::model::Message;
use parley_entity::user::role::UserRole;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;
use crate::events::{InboundEvent, OutboundEvent};
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;
use crate::store::{ChatStore, MessageStore, UserStore};

/// Central coordinator for live connections.
pub struct ConnectionManager {
    config: RealtimeConfig,
    pool: ConnectionPool,
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomRegistry>,
    chats: Arc<dyn ChatStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserStore>,
}

impl ConnectionManager {
    /// Create a new manager over the given stores.
    pub fn new(
        config: RealtimeConfig,
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
        chats: Arc<dyn ChatStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            pool: ConnectionPool::new(),
            presence,
            rooms,
            chats,
            messages,
            users,
        }
    }

    /// Register a new authenticated connection.
    ///
    /// Returns the handle, the receiver half of its outbound channel, and
    /// whether this connection brought the user online. The online edge
    /// is broadcast to every other connection here.
    pub fn register(
        &self,
        user_id: UserId,
        role: UserRole,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>, bool) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, role, username, tx));
        self.pool.add(Arc::clone(&handle));

        let came_online = self.presence.add_connection(user_id, handle.id);
        if came_online {
            self.broadcast_all_except(handle.id, &OutboundEvent::UserOnline { user_id });
        }

        info!(
            connection_id = %handle.id,
            user_id = %user_id,
            username = %handle.username,
            came_online,
            "WebSocket connection registered"
        );

        (handle, rx, came_online)
    }

    /// Tear down a connection: leave all rooms, update presence, and
    /// broadcast the offline edge if this was the user's last connection.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let Some(handle) = self.pool.remove(connection_id) else {
            return;
        };
        handle.mark_dead();

        let rooms_left = self.rooms.leave_all(connection_id);
        let went_offline = self.presence.remove_connection(handle.user_id, connection_id);

        if went_offline {
            if let Err(e) = self
                .users
                .update_last_seen(handle.user_id, chrono::Utc::now())
                .await
            {
                warn!(user_id = %handle.user_id, error = %e, "Failed to update last seen");
            }
            self.broadcast_all(&OutboundEvent::UserOffline {
                user_id: handle.user_id,
            });
        }

        info!(
            connection_id = %connection_id,
            user_id = %handle.user_id,
            rooms_left,
            went_offline,
            "WebSocket connection unregistered"
        );
    }

    /// Route one inbound frame from a client.
    pub async fn handle_inbound(&self, connection_id: ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(connection_id) else {
            warn!(connection_id = %connection_id, "Inbound frame from unknown connection");
            return;
        };

        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Dropping malformed inbound frame"
                );
                return;
            }
        };

        match event {
            InboundEvent::JoinRoom { chat_id } => self.join_room(&handle, chat_id).await,
            InboundEvent::LeaveRoom { chat_id } => {
                self.rooms.leave(chat_id, connection_id);
                debug!(connection_id = %connection_id, chat_id = %chat_id, "Left room");
            }
            InboundEvent::MessageDelivered { message_id } => {
                self.apply_receipt(&handle, message_id, true).await;
            }
            InboundEvent::MessageRead { message_id } => {
                self.apply_receipt(&handle, message_id, false).await;
            }
            InboundEvent::TypingStart { chat_id } => {
                self.relay_typing(&handle, chat_id, true);
            }
            InboundEvent::TypingStop { chat_id } => {
                self.relay_typing(&handle, chat_id, false);
            }
        }
    }

    /// Join a connection to a room after re-validating chat membership
    /// against the database. A valid token alone is not enough: the user
    /// may have been removed from the chat since it was issued.
    async fn join_room(&self, handle: &ConnectionHandle, chat_id: ChatId) {
        if self.rooms.joined_count(handle.id) >= self.config.max_rooms_per_connection {
            warn!(
                connection_id = %handle.id,
                chat_id = %chat_id,
                "Join refused: room limit reached"
            );
            return;
        }

        match self.chats.is_participant(chat_id, handle.user_id).await {
            Ok(true) => {
                self.rooms.join(chat_id, handle.id);
                debug!(connection_id = %handle.id, chat_id = %chat_id, "Joined room");
            }
            Ok(false) => {
                warn!(
                    connection_id = %handle.id,
                    user_id = %handle.user_id,
                    chat_id = %chat_id,
                    "Join refused: not a chat participant"
                );
            }
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Join failed: membership check error");
            }
        }
    }

    /// Apply a delivery or read receipt. Stale receipts (already past the
    /// target status) come back as `None` and are ignored.
    async fn apply_receipt(&self, handle: &ConnectionHandle, message_id: MessageId, delivered: bool) {
        let result = if delivered {
            self.messages.mark_delivered(message_id).await
        } else {
            self.messages.mark_read(message_id).await
        };

        match result {
            Ok(Some(message)) => {
                debug!(
                    message_id = %message_id,
                    status = %message.status,
                    user_id = %handle.user_id,
                    "Receipt applied"
                );
            }
            Ok(None) => {
                debug!(message_id = %message_id, "Receipt ignored: missing or stale");
            }
            Err(e) => {
                warn!(message_id = %message_id, error = %e, "Receipt failed");
            }
        }
    }

    /// Relay a typing indicator to the rest of the room.
    fn relay_typing(&self, handle: &ConnectionHandle, chat_id: ChatId, started: bool) {
        if !self.rooms.is_member(chat_id, handle.id) {
            return;
        }
        let event = if started {
            OutboundEvent::TypingStart {
                chat_id,
                user_id: handle.user_id,
            }
        } else {
            OutboundEvent::TypingStop {
                chat_id,
                user_id: handle.user_id,
            }
        };
        self.broadcast_to_room_except(chat_id, handle.id, &event);
    }

    /// Announce a newly created message to its chat's room.
    pub fn broadcast_message_new(&self, message: &Message) {
        self.broadcast_to_room(message.chat_id, &OutboundEvent::message_new(message));
    }

    /// Announce an edited message to its chat's room.
    pub fn broadcast_message_updated(&self, message: &Message) {
        self.broadcast_to_room(
            message.chat_id,
            &OutboundEvent::MessageUpdated {
                message: message.clone(),
            },
        );
    }

    /// Announce a deleted message to its chat's room.
    pub fn broadcast_message_deleted(&self, chat_id: ChatId, message_id: MessageId) {
        self.broadcast_to_room(chat_id, &OutboundEvent::MessageDeleted { chat_id, message_id });
    }

    /// Fan a frame out to every member of a room.
    pub fn broadcast_to_room(&self, chat_id: ChatId, event: &OutboundEvent) {
        let Some(frame) = event.to_frame() else { return };
        self.rooms.for_each_member(chat_id, |member| {
            if let Some(handle) = self.pool.get(member) {
                handle.send(frame.clone());
            }
        });
    }

    /// Fan a frame out to a room, skipping one connection.
    pub fn broadcast_to_room_except(
        &self,
        chat_id: ChatId,
        skip: ConnectionId,
        event: &OutboundEvent,
    ) {
        let Some(frame) = event.to_frame() else { return };
        self.rooms.for_each_member(chat_id, |member| {
            if member == skip {
                return;
            }
            if let Some(handle) = self.pool.get(member) {
                handle.send(frame.clone());
            }
        });
    }

    /// Fan a frame out to every live connection.
    pub fn broadcast_all(&self, event: &OutboundEvent) {
        let Some(frame) = event.to_frame() else { return };
        for handle in self.pool.all() {
            handle.send(frame.clone());
        }
    }

    /// Fan a frame out to every live connection except one.
    pub fn broadcast_all_except(&self, skip: ConnectionId, event: &OutboundEvent) {
        let Some(frame) = event.to_frame() else { return };
        for handle in self.pool.all() {
            if handle.id != skip {
                handle.send(frame.clone());
            }
        }
    }

    /// Whether a user has at least one live connection
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.presence.is_online(user_id)
    }

    /// Live connection count
    pub fn connection_count(&self) -> usize {
        self.pool.len()
    }

    /// Drop every connection without presence broadcasts. Used during
    /// shutdown.
    pub fn close_all(&self) {
        for handle in self.pool.all() {
            handle.mark_dead();
            self.rooms.leave_all(handle.id);
            self.presence.remove_connection(handle.user_id, handle.id);
            self.pool.remove(handle.id);
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.pool.len())
            .field("rooms", &self.rooms.room_count())
            .field("online_users", &self.presence.online_count())
            .finish()
    }
}
