//! User self-service operations and public profile lookups.

use std::sync::Arc;

use tracing::info;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_core::types::UserId;
use parley_database::repositories::user::UserRepository;
use parley_entity::user::model::{PublicUser, UpdateUser, User};

use crate::context::RequestContext;

/// Handles user profile operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Gets the current user's full profile.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    pub async fn update_me(&self, ctx: &RequestContext, update: UpdateUser) -> AppResult<User> {
        if let Some(bio) = &update.bio {
            if bio.len() > 500 {
                return Err(AppError::validation("Bio is limited to 500 characters"));
            }
        }

        let user = self.user_repo.update_profile(ctx.user_id, &update).await?;

        info!(user_id = %ctx.user_id, "Profile updated");

        Ok(user)
    }

    /// Gets another user's public profile.
    pub async fn get_public(&self, user_id: UserId) -> AppResult<PublicUser> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(|user| user.to_public())
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Lists public profiles, paginated.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<PublicUser>> {
        let users = self.user_repo.find_all(page).await?;
        Ok(users.map(|user| user.to_public()))
    }
}
