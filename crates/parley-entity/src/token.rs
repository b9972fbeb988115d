//! Persisted refresh token model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use parley_core::types::UserId;

/// A refresh token issued at login. Rotated on every refresh and revoked at
/// logout; access tokens are stateless and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Token record identifier (also the JWT `jti`).
    pub id: Uuid,
    /// The user the token was issued to.
    pub user_id: UserId,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been revoked (logout or rotation).
    pub revoked: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token can still be used.
    pub fn is_active(&self) -> bool {
        !self.revoked && self.expires_at > Utc::now()
    }
}
