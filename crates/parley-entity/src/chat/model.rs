//! Chat conversation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use parley_core::types::{ChatId, UserId};

/// A direct or group conversation between two or more users.
///
/// The chat's identity doubles as the realtime room key: a connection joins
/// room `chat.id` to receive live events for this conversation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique chat identifier.
    pub id: ChatId,
    /// The user who created the chat and administers it.
    pub admin_id: UserId,
    /// Users participating in the chat. Loaded from the join table, not a
    /// column of the `chats` row itself.
    #[sqlx(skip)]
    pub participants: Vec<UserId>,
    /// When the chat was created.
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Check whether a user participates in this chat.
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }
}

/// Data required to create a new chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChat {
    /// The creating user, who becomes admin and a participant.
    pub admin_id: UserId,
    /// Additional participants (the admin is added implicitly).
    pub participants: Vec<UserId>,
}
