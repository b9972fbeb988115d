//! Missed-message replay.
//!
//! When a user comes online, every message still in `sent` status across
//! their chats is pushed to the new connection as `message-new`, oldest
//! first. Replay never changes message status; the client acknowledges
//! with `message-delivered` receipts, so delivery is at-least-once.

use std::sync::Arc;

use tracing::{info, warn};

use crate::connection::handle::ConnectionHandle;
use crate::events::OutboundEvent;
use crate::store::{ChatStore, MessageStore};

/// Pushes undelivered messages to freshly online users.
pub struct MessageReplayer {
    chats: Arc<dyn ChatStore>,
    messages: Arc<dyn MessageStore>,
}

impl MessageReplayer {
    /// Create a new replayer over the given stores.
    pub fn new(chats: Arc<dyn ChatStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { chats, messages }
    }

    /// Replay undelivered messages to one connection. Returns how many
    /// frames were pushed. Store failures are logged and replay is
    /// skipped; the connection itself stays up.
    pub async fn replay(&self, handle: &ConnectionHandle) -> usize {
        let chat_ids = match self.chats.chat_ids_for_participant(handle.user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id = %handle.user_id, error = %e, "Replay skipped: chat lookup failed");
                return 0;
            }
        };
        if chat_ids.is_empty() {
            return 0;
        }

        let missed = match self.messages.find_undelivered(&chat_ids).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(user_id = %handle.user_id, error = %e, "Replay skipped: message query failed");
                return 0;
            }
        };

        let mut pushed = 0;
        for message in &missed {
            if let Some(frame) = OutboundEvent::message_new(message).to_frame() {
                // Wait for buffer space: a backlog may be larger than the
                // connection's channel. A dead connection ends the replay.
                if handle.send_queued(frame).await {
                    pushed += 1;
                } else {
                    break;
                }
            }
        }

        if pushed > 0 {
            info!(
                user_id = %handle.user_id,
                connection_id = %handle.id,
                pushed,
                "Replayed missed messages"
            );
        }
        pushed
    }
}
