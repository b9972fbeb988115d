//! Chat endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use parley_core::types::ChatId;
use parley_entity::chat::model::Chat;

use crate::dto::request::CreateChatRequest;
use crate::error::{ApiError, validation_error};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/chats
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Chat>), ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let chat = state.chat_service.create(&auth, body.participants).await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// GET /api/chats
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Chat>>, ApiError> {
    let chats = state.chat_service.list(&auth).await?;
    Ok(Json(chats))
}

/// GET /api/chats/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<ChatId>,
) -> Result<Json<Chat>, ApiError> {
    let chat = state.chat_service.get(&auth, chat_id).await?;
    Ok(Json(chat))
}

/// DELETE /api/chats/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<ChatId>,
) -> Result<StatusCode, ApiError> {
    state.chat_service.delete(&auth, chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
