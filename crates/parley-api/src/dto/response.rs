//! Response body DTOs.

use serde::{Deserialize, Serialize};

use parley_entity::user::model::User;
use parley_service::auth::AuthTokens;

/// Returned by register and login: the account plus its tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user.
    pub user: User,
    /// Issued token pair.
    pub tokens: AuthTokens,
}

/// Simple acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl AckResponse {
    /// Build an acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
