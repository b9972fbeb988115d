//! Message repository implementation.
//!
//! Status updates are guarded in SQL so a stale receipt can never regress a
//! message (`read → delivered` etc.); a guard miss returns `None` and the
//! caller decides whether that is worth logging.

use sqlx::PgPool;
use uuid::Uuid;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_core::types::{ChatId, MessageId, UserId};
use parley_entity::message::model::{CreateMessage, Message};

/// Repository for messages and their delivery status.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new message with status `sent`.
    pub async fn create(&self, message: &CreateMessage) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, chat_id, sender_id, content, status)
             VALUES ($1, $2, $3, $4, 'sent')
             RETURNING *",
        )
        .bind(MessageId::new())
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a message by primary key.
    pub async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find message by id", e)
            })
    }

    /// List a chat's messages, newest first, paginated.
    pub async fn find_by_chat(
        &self,
        chat_id: ChatId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Message>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count messages", e)
            })?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE chat_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(chat_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))?;

        Ok(PageResponse::new(
            messages,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Edit a message's content. Only the sender may edit; the check is
    /// part of the query so there is no read-modify-write window.
    pub async fn update_content(
        &self,
        id: MessageId,
        sender_id: UserId,
        content: &str,
    ) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET content = $3, updated_at = NOW()
             WHERE id = $1 AND sender_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(sender_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update message", e))
    }

    /// Delete a message. Only the sender may delete.
    pub async fn delete(&self, id: MessageId, sender_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1 AND sender_id = $2")
            .bind(id)
            .bind(sender_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete message", e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition `sent → delivered`. Returns `None` if the message does
    /// not exist or is already past `sent`.
    pub async fn mark_delivered(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET status = 'delivered', updated_at = NOW()
             WHERE id = $1 AND status = 'sent'
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark delivered", e))
    }

    /// Transition `sent → read` or `delivered → read`. Returns `None` if
    /// the message does not exist or is already `read`.
    pub async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET status = 'read', updated_at = NOW()
             WHERE id = $1 AND status IN ('sent', 'delivered')
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))
    }

    /// All messages still in `sent` status across the given chats, oldest
    /// first. This is the missed-message replay query.
    pub async fn find_undelivered(&self, chat_ids: &[ChatId]) -> AppResult<Vec<Message>> {
        let ids: Vec<Uuid> = chat_ids.iter().map(|c| c.0).collect();

        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE status = 'sent' AND chat_id = ANY($1)
             ORDER BY created_at ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list undelivered messages", e)
        })
    }
}
