//! Request body DTOs with validation rules.

use serde::Deserialize;
use validator::Validate;

use parley_core::types::UserId;

/// Body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password (hashed before storage).
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address.
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body for `POST /api/auth/refresh` and `POST /api/auth/logout`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token issued at login.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Body for `PUT /api/users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New avatar URL.
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
    /// New profile text.
    #[validate(length(max = 500, message = "Bio is limited to 500 characters"))]
    pub bio: Option<String>,
}

/// Body for `POST /api/chats`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatRequest {
    /// Participants besides the creator.
    #[validate(length(min = 1, message = "A chat needs at least one other participant"))]
    pub participants: Vec<UserId>,
}

/// Body for `POST /api/chats/{id}/messages` and message edits.
#[derive(Debug, Deserialize, Validate)]
pub struct MessageContentRequest {
    /// Message body.
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}
