//! Wire format for realtime events.
//!
//! Every frame is a JSON object tagged by `event`. Inbound events are what
//! clients send over the socket; outbound events are what the server pushes.

use serde::{Deserialize, Serialize};

use parley_core::types::{ChatId, MessageId, UserId};
use parley_entity::message::model::Message;

/// Events received from a connected client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum InboundEvent {
    /// Subscribe this connection to a chat's broadcasts.
    JoinRoom { chat_id: ChatId },
    /// Unsubscribe this connection from a chat.
    LeaveRoom { chat_id: ChatId },
    /// Delivery receipt for a message.
    MessageDelivered { message_id: MessageId },
    /// Read receipt for a message.
    MessageRead { message_id: MessageId },
    /// The sender started typing in a chat.
    TypingStart { chat_id: ChatId },
    /// The sender stopped typing in a chat.
    TypingStop { chat_id: ChatId },
}

/// Events pushed to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    /// A new message was created in a chat the client has joined.
    MessageNew {
        id: MessageId,
        chat_id: ChatId,
        sender: UserId,
        content: String,
    },
    /// A message was edited. The message's fields sit at the top level of
    /// the frame, next to the `event` tag.
    MessageUpdated {
        #[serde(flatten)]
        message: Message,
    },
    /// A message was deleted.
    MessageDeleted { chat_id: ChatId, message_id: MessageId },
    /// A user went from zero connections to at least one.
    UserOnline { user_id: UserId },
    /// A user's last connection closed.
    UserOffline { user_id: UserId },
    /// Someone else in the room started typing.
    TypingStart { chat_id: ChatId, user_id: UserId },
    /// Someone else in the room stopped typing.
    TypingStop { chat_id: ChatId, user_id: UserId },
}

impl OutboundEvent {
    /// Build a `message-new` event from a stored message.
    pub fn message_new(message: &Message) -> Self {
        Self::MessageNew {
            id: message.id,
            chat_id: message.chat_id,
            sender: message.sender_id,
            content: message.content.clone(),
        }
    }

    /// Serialize to a JSON frame. Returns `None` (and logs) on failure,
    /// which cannot happen for these types in practice.
    pub fn to_frame(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize outbound event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_join_room_parses() {
        let chat_id = ChatId::new();
        let raw = format!(r#"{{"event":"join-room","chatId":"{}"}}"#, chat_id);
        let event: InboundEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(event, InboundEvent::JoinRoom { chat_id });
    }

    #[test]
    fn inbound_receipt_parses() {
        let message_id = MessageId::new();
        let raw = format!(r#"{{"event":"message-delivered","messageId":"{}"}}"#, message_id);
        let event: InboundEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(event, InboundEvent::MessageDelivered { message_id });
    }

    #[test]
    fn unknown_event_is_an_error() {
        let raw = r#"{"event":"self-destruct"}"#;
        assert!(serde_json::from_str::<InboundEvent>(raw).is_err());
    }

    #[test]
    fn outbound_user_online_frame_shape() {
        let user_id = UserId::new();
        let frame = OutboundEvent::UserOnline { user_id }.to_frame().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "user-online");
        assert_eq!(value["userId"], user_id.to_string());
    }

    #[test]
    fn outbound_message_updated_flattens_message_fields() {
        let now = chrono::Utc::now();
        let message = Message {
            id: MessageId::new(),
            chat_id: ChatId::new(),
            sender_id: UserId::new(),
            content: "edited".into(),
            status: parley_entity::message::status::MessageStatus::Sent,
            created_at: now,
            updated_at: now,
        };
        let frame = OutboundEvent::MessageUpdated {
            message: message.clone(),
        }
        .to_frame()
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "message-updated");
        assert_eq!(value["id"], message.id.to_string());
        assert_eq!(value["chatId"], message.chat_id.to_string());
        assert_eq!(value["content"], "edited");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn outbound_typing_frame_shape() {
        let chat_id = ChatId::new();
        let user_id = UserId::new();
        let frame = OutboundEvent::TypingStart { chat_id, user_id }
            .to_frame()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "typing-start");
        assert_eq!(value["chatId"], chat_id.to_string());
    }
}
