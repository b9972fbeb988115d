//! Message endpoints.
//!
//! Mutations broadcast to the chat's realtime room after the database
//! write succeeds, so REST clients and connected sockets stay in step.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use parley_core::types::pagination::{PageRequest, PageResponse};
use parley_core::types::{ChatId, MessageId};
use parley_entity::message::model::Message;

use crate::dto::request::MessageContentRequest;
use crate::error::{ApiError, validation_error};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/chats/{id}/messages
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<ChatId>,
    Json(body): Json<MessageContentRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let message = state.message_service.send(&auth, chat_id, &body.content).await?;
    state.realtime.connections.broadcast_message_new(&message);

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/chats/{id}/messages
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<ChatId>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<Message>>, ApiError> {
    let messages = state.message_service.list(&auth, chat_id, &page).await?;
    Ok(Json(messages))
}

/// PUT /api/chats/{id}/messages/{messageId}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((chat_id, message_id)): Path<(ChatId, MessageId)>,
    Json(body): Json<MessageContentRequest>,
) -> Result<Json<Message>, ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let message = state
        .message_service
        .edit(&auth, chat_id, message_id, &body.content)
        .await?;
    state.realtime.connections.broadcast_message_updated(&message);

    Ok(Json(message))
}

/// DELETE /api/chats/{id}/messages/{messageId}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((chat_id, message_id)): Path<(ChatId, MessageId)>,
) -> Result<StatusCode, ApiError> {
    state
        .message_service
        .delete(&auth, chat_id, message_id)
        .await?;
    state
        .realtime
        .connections
        .broadcast_message_deleted(chat_id, message_id);

    Ok(StatusCode::NO_CONTENT)
}
