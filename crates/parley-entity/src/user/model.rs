//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use parley_core::types::UserId;

use super::role::UserRole;

/// A registered user of the chat system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role (admin or regular user).
    pub role: UserRole,
    /// Avatar URL (optional).
    pub avatar: Option<String>,
    /// Short profile text (optional).
    pub bio: Option<String>,
    /// When the user was last seen online. Updated when the user's final
    /// realtime connection closes.
    pub last_seen: DateTime<Utc>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Strip private fields for exposure to other users.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            last_seen: self.last_seen,
        }
    }
}

/// The subset of a user profile visible to other users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Avatar URL (optional).
    pub avatar: Option<String>,
    /// Short profile text (optional).
    pub bio: Option<String>,
    /// When the user was last seen online.
    pub last_seen: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}

/// Data for updating an existing user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New avatar URL.
    pub avatar: Option<String>,
    /// New profile text.
    pub bio: Option<String>,
}
