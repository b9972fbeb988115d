//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use parley_core::types::{ChatId, MessageId, UserId};

use super::status::MessageStatus;

/// A single message inside a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The chat this message belongs to.
    pub chat_id: ChatId,
    /// The user who sent it.
    pub sender_id: UserId,
    /// Message body.
    pub content: String,
    /// Delivery status (`sent` / `delivered` / `read`).
    pub status: MessageStatus,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// When the message was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new message. Status always starts at `sent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Target chat.
    pub chat_id: ChatId,
    /// Sending user.
    pub sender_id: UserId,
    /// Message body.
    pub content: String,
}
