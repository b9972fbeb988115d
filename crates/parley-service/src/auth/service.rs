//! Authentication service: register, login, token refresh, logout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use parley_auth::jwt::decoder::JwtDecoder;
use parley_auth::jwt::encoder::JwtEncoder;
use parley_auth::password::hasher::PasswordHasher;
use parley_core::config::auth::AuthConfig;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_database::repositories::refresh_token::RefreshTokenRepository;
use parley_database::repositories::user::UserRepository;
use parley_entity::user::model::{CreateUser, User};
use parley_entity::user::UserRole;

/// Tokens returned to the client after register, login, or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Handles account lifecycle and token issuance.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Refresh token repository.
    token_repo: Arc<RefreshTokenRepository>,
    /// JWT encoder.
    encoder: Arc<JwtEncoder>,
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Minimum allowed password length.
    password_min_length: usize,
}

impl AuthService {
    /// Creates a new authentication service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        token_repo: Arc<RefreshTokenRepository>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        hasher: Arc<PasswordHasher>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            encoder,
            decoder,
            hasher,
            password_min_length: config.password_min_length,
        }
    }

    /// Registers a new account and signs the user in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(User, AuthTokens)> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(AppError::validation("Invalid email format"));
        }
        if password.len() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .user_repo
            .create(&CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: UserRole::User,
            })
            .await?;

        let tokens = self.issue_tokens(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok((user, tokens))
    }

    /// Signs a user in with their username or email.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<(User, AuthTokens)> {
        let identifier = identifier.trim();

        let user = if identifier.contains('@') {
            self.user_repo.find_by_email(identifier).await?
        } else {
            self.user_repo.find_by_username(identifier).await?
        };

        let user = user.ok_or_else(|| AppError::authentication("Invalid credentials"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::authentication("Invalid credentials"));
        }

        let tokens = self.issue_tokens(&user).await?;

        info!(user_id = %user.id, "User logged in");

        Ok((user, tokens))
    }

    /// Exchanges a refresh token for a fresh token pair, rotating the old
    /// one out. A revoked, expired, or unknown token is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;

        let stored = self
            .token_repo
            .find_by_id(claims.jti)
            .await?
            .ok_or_else(|| AppError::authentication("Refresh token not recognized"))?;

        if !stored.is_active() {
            warn!(user_id = %claims.sub, "Refresh rejected: token revoked or expired");
            return Err(AppError::authentication("Refresh token is no longer valid"));
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        self.token_repo.revoke(stored.id).await?;
        let tokens = self.issue_tokens(&user).await?;

        info!(user_id = %user.id, "Tokens refreshed");

        Ok(tokens)
    }

    /// Revokes a refresh token, ending the session it represents.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        self.token_repo.revoke(claims.jti).await?;

        info!(user_id = %claims.sub, "User logged out");

        Ok(())
    }

    /// Issues a token pair and persists the refresh half for revocation.
    async fn issue_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let pair = self
            .encoder
            .generate_token_pair(user.id, user.role, &user.username)?;

        self.token_repo
            .create(pair.refresh_jti, user.id, pair.refresh_expires_at)
            .await?;

        Ok(AuthTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
        })
    }
}
