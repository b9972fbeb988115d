//! Chat repository implementation.
//!
//! Participants live in the `chat_participants` join table; `Chat` rows are
//! hydrated with their participant list after the row query.

use sqlx::PgPool;
use uuid::Uuid;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::types::{ChatId, UserId};
use parley_entity::chat::model::{Chat, CreateChat};

/// Repository for chat conversations and participant membership.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a chat with its participant set in one transaction. The admin
    /// is always a participant.
    pub async fn create(&self, chat: &CreateChat) -> AppResult<Chat> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut created = sqlx::query_as::<_, Chat>(
            "INSERT INTO chats (id, admin_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(ChatId::new())
        .bind(chat.admin_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create chat", e))?;

        let mut participants: Vec<UserId> = vec![chat.admin_id];
        for p in &chat.participants {
            if !participants.contains(p) {
                participants.push(*p);
            }
        }

        for user_id in &participants {
            sqlx::query("INSERT INTO chat_participants (chat_id, user_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to add participant", e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit chat creation", e)
        })?;

        created.participants = participants;
        Ok(created)
    }

    /// Find a chat by primary key, with participants loaded.
    pub async fn find_by_id(&self, id: ChatId) -> AppResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find chat by id", e)
            })?;

        match chat {
            Some(mut chat) => {
                chat.participants = self.participants_of(id).await?;
                Ok(Some(chat))
            }
            None => Ok(None),
        }
    }

    /// List every chat the user participates in, with participants loaded.
    pub async fn find_by_participant(&self, user_id: UserId) -> AppResult<Vec<Chat>> {
        let mut chats = sqlx::query_as::<_, Chat>(
            "SELECT c.* FROM chats c
             JOIN chat_participants cp ON cp.chat_id = c.id
             WHERE cp.user_id = $1
             ORDER BY c.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list chats by participant", e)
        })?;

        for chat in &mut chats {
            chat.participants = self.participants_of(chat.id).await?;
        }
        Ok(chats)
    }

    /// Return only the chat ids the user participates in. Used by the
    /// missed-message replayer, which has no need for hydrated rows.
    pub async fn chat_ids_for_participant(&self, user_id: UserId) -> AppResult<Vec<ChatId>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT chat_id FROM chat_participants WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to list chat ids", e)
                })?;

        Ok(ids.into_iter().map(ChatId::from_uuid).collect())
    }

    /// Check whether a user participates in a chat.
    pub async fn is_participant(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM chat_participants WHERE chat_id = $1 AND user_id = $2
             )",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check chat membership", e)
        })?;

        Ok(exists)
    }

    /// Delete a chat (cascades to participants and messages).
    pub async fn delete(&self, id: ChatId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete chat", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Load the participant user ids for a chat.
    async fn participants_of(&self, chat_id: ChatId) -> AppResult<Vec<UserId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM chat_participants WHERE chat_id = $1 ORDER BY joined_at",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load participants", e)
        })?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
