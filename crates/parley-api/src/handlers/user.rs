//! User profile endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use parley_core::types::UserId;
use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_entity::user::model::{PublicUser, UpdateUser, User};

use crate::dto::request::UpdateProfileRequest;
use crate::error::{ApiError, validation_error};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state.user_service.me(&auth).await?;
    Ok(Json(user))
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let update = UpdateUser {
        avatar: body.avatar,
        bio: body.bio,
    };
    let user = state.user_service.update_me(&auth, update).await?;

    Ok(Json(user))
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<PublicUser>>, ApiError> {
    let users = state.user_service.list(&page).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.user_service.get_public(user_id).await?;
    Ok(Json(user))
}
