//! Chat service: conversations and their participant lists.

use std::sync::Arc;

use tracing::info;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::{ChatId, UserId};
use parley_database::repositories::chat::ChatRepository;
use parley_database::repositories::user::UserRepository;
use parley_entity::chat::model::{Chat, CreateChat};

use crate::context::RequestContext;

/// Handles chat conversations.
#[derive(Debug, Clone)]
pub struct ChatService {
    /// Chat repository.
    chat_repo: Arc<ChatRepository>,
    /// User repository, for participant validation.
    user_repo: Arc<UserRepository>,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(chat_repo: Arc<ChatRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            chat_repo,
            user_repo,
        }
    }

    /// Creates a chat with the current user as admin. Every named
    /// participant must be an existing user.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        participants: Vec<UserId>,
    ) -> AppResult<Chat> {
        if participants.is_empty() {
            return Err(AppError::validation("A chat needs at least one other participant"));
        }

        for &user_id in &participants {
            if user_id == ctx.user_id {
                continue;
            }
            if self.user_repo.find_by_id(user_id).await?.is_none() {
                return Err(AppError::validation(format!("Unknown participant: {user_id}")));
            }
        }

        let chat = self
            .chat_repo
            .create(&CreateChat {
                admin_id: ctx.user_id,
                participants,
            })
            .await?;

        info!(chat_id = %chat.id, admin_id = %ctx.user_id, "Chat created");

        Ok(chat)
    }

    /// Lists the current user's chats.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Chat>> {
        self.chat_repo.find_by_participant(ctx.user_id).await
    }

    /// Gets a single chat the current user participates in.
    pub async fn get(&self, ctx: &RequestContext, chat_id: ChatId) -> AppResult<Chat> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat not found"))?;

        if !chat.has_participant(ctx.user_id) && !ctx.is_admin() {
            return Err(AppError::authorization("Not a participant of this chat"));
        }

        Ok(chat)
    }

    /// Deletes a chat. Only the chat's admin (or a platform admin) may
    /// delete it; messages go with it.
    pub async fn delete(&self, ctx: &RequestContext, chat_id: ChatId) -> AppResult<()> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat not found"))?;

        if chat.admin_id != ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization("Only the chat admin can delete it"));
        }

        self.chat_repo.delete(chat_id).await?;

        info!(chat_id = %chat_id, user_id = %ctx.user_id, "Chat deleted");

        Ok(())
    }
}
