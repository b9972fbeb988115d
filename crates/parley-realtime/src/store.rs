//! Persistence seams for the realtime engine.
//!
//! The engine only needs a few narrow queries, so they are expressed as
//! traits here and implemented by the concrete repositories. Tests swap in
//! in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parley_core::result::AppResult;
use parley_core::types::{ChatId, MessageId, UserId};
use parley_database::repositories::chat::ChatRepository;
use parley_database::repositories::message::MessageRepository;
use parley_database::repositories::user::UserRepository;
use parley_entity::message::model::Message;

/// Chat membership queries used for room join validation and replay.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Ids of every chat the user participates in.
    async fn chat_ids_for_participant(&self, user_id: UserId) -> AppResult<Vec<ChatId>>;

    /// Whether the user participates in the chat right now.
    async fn is_participant(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool>;
}

/// Message status queries used for receipts and replay.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Transition `sent → delivered`. `None` when the message is missing
    /// or already past `sent`.
    async fn mark_delivered(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Transition to `read`. `None` when the message is missing or
    /// already `read`.
    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Messages still in `sent` status across the given chats, oldest
    /// first.
    async fn find_undelivered(&self, chat_ids: &[ChatId]) -> AppResult<Vec<Message>>;
}

/// User bookkeeping on presence transitions.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Record when the user was last seen online.
    async fn update_last_seen(&self, user_id: UserId, at: DateTime<Utc>) -> AppResult<()>;
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn chat_ids_for_participant(&self, user_id: UserId) -> AppResult<Vec<ChatId>> {
        ChatRepository::chat_ids_for_participant(self, user_id).await
    }

    async fn is_participant(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        ChatRepository::is_participant(self, chat_id, user_id).await
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn mark_delivered(&self, id: MessageId) -> AppResult<Option<Message>> {
        MessageRepository::mark_delivered(self, id).await
    }

    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>> {
        MessageRepository::mark_read(self, id).await
    }

    async fn find_undelivered(&self, chat_ids: &[ChatId]) -> AppResult<Vec<Message>> {
        MessageRepository::find_undelivered(self, chat_ids).await
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn update_last_seen(&self, user_id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        UserRepository::update_last_seen(self, user_id, at).await
    }
}
