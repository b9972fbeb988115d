//! Authentication endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use parley_service::auth::AuthTokens;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{AckResponse, AuthResponse};
use crate::error::{ApiError, validation_error};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let (user, tokens) = state
        .auth_service
        .register(&body.username, &body.email, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, tokens })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let (user, tokens) = state
        .auth_service
        .login(&body.identifier, &body.password)
        .await?;

    Ok(Json(AuthResponse { user, tokens }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    let tokens = state.auth_service.refresh(&body.refresh_token).await?;

    Ok(Json(tokens))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    body.validate().map_err(|e| validation_error(&e))?;

    state.auth_service.logout(&body.refresh_token).await?;

    Ok(Json(AckResponse::new("Logged out")))
}
