//! Refresh token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::types::UserId;
use parley_entity::token::RefreshToken;

/// Repository for persisted refresh tokens.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued refresh token.
    pub async fn create(
        &self,
        id: Uuid,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (id, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store refresh token", e)
        })
    }

    /// Find a refresh token by its id (the JWT `jti`).
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Revoke a single refresh token. Returns whether a live token was
    /// actually revoked.
    pub async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1 AND NOT revoked")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
                })?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live token for a user (e.g. password change).
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user tokens", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Remove expired and revoked tokens.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW() OR revoked")
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to purge tokens", e)
                })?;

        Ok(result.rows_affected())
    }
}
