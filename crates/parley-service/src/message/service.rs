//! Message service.
//!
//! Every operation checks chat membership before touching messages; edits
//! and deletes are further restricted to the original sender.

use std::sync::Arc;

use tracing::info;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_core::types::{ChatId, MessageId};
use parley_database::repositories::chat::ChatRepository;
use parley_database::repositories::message::MessageRepository;
use parley_entity::message::model::{CreateMessage, Message};

use crate::context::RequestContext;

/// Handles message creation, listing, editing, and deletion.
#[derive(Debug, Clone)]
pub struct MessageService {
    /// Message repository.
    message_repo: Arc<MessageRepository>,
    /// Chat repository, for membership checks.
    chat_repo: Arc<ChatRepository>,
}

impl MessageService {
    /// Creates a new message service.
    pub fn new(message_repo: Arc<MessageRepository>, chat_repo: Arc<ChatRepository>) -> Self {
        Self {
            message_repo,
            chat_repo,
        }
    }

    /// Sends a message to a chat the current user participates in.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        content: &str,
    ) -> AppResult<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }
        if content.len() > 4000 {
            return Err(AppError::validation("Message is limited to 4000 characters"));
        }

        self.require_membership(ctx, chat_id).await?;

        let message = self
            .message_repo
            .create(&CreateMessage {
                chat_id,
                sender_id: ctx.user_id,
                content: content.to_string(),
            })
            .await?;

        info!(message_id = %message.id, chat_id = %chat_id, "Message sent");

        Ok(message)
    }

    /// Lists a chat's messages, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Message>> {
        self.require_membership(ctx, chat_id).await?;
        self.message_repo.find_by_chat(chat_id, page).await
    }

    /// Edits a message. Only the sender may edit.
    pub async fn edit(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        message_id: MessageId,
        content: &str,
    ) -> AppResult<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content cannot be empty"));
        }

        let existing = self.get_in_chat(ctx, chat_id, message_id).await?;
        if existing.sender_id != ctx.user_id {
            return Err(AppError::authorization("Only the sender can edit a message"));
        }

        let updated = self
            .message_repo
            .update_content(message_id, ctx.user_id, content)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;

        info!(message_id = %message_id, "Message edited");

        Ok(updated)
    }

    /// Deletes a message, returning it for broadcast. Only the sender may
    /// delete.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> AppResult<Message> {
        let existing = self.get_in_chat(ctx, chat_id, message_id).await?;
        if existing.sender_id != ctx.user_id {
            return Err(AppError::authorization("Only the sender can delete a message"));
        }

        let deleted = self.message_repo.delete(message_id, ctx.user_id).await?;
        if !deleted {
            return Err(AppError::not_found("Message not found"));
        }

        info!(message_id = %message_id, "Message deleted");

        Ok(existing)
    }

    /// Loads a message after checking it belongs to the given chat and
    /// that the current user participates in that chat.
    async fn get_in_chat(
        &self,
        ctx: &RequestContext,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> AppResult<Message> {
        self.require_membership(ctx, chat_id).await?;

        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::not_found("Message not found"))?;

        if message.chat_id != chat_id {
            return Err(AppError::not_found("Message not found"));
        }

        Ok(message)
    }

    async fn require_membership(&self, ctx: &RequestContext, chat_id: ChatId) -> AppResult<()> {
        if self.chat_repo.is_participant(chat_id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::authorization("Not a participant of this chat"))
        }
    }
}
