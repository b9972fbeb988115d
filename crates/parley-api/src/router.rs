//! Route definitions for the Parley HTTP API.
//!
//! REST routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at `/ws`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Maximum accepted request body size in bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(chat_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// User profile endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::list))
        .route("/users/me", get(handlers::user::me))
        .route("/users/me", put(handlers::user::update_me))
        .route("/users/{id}", get(handlers::user::get))
}

/// Chat and nested message endpoints
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", post(handlers::chat::create))
        .route("/chats", get(handlers::chat::list))
        .route("/chats/{id}", get(handlers::chat::get))
        .route("/chats/{id}", delete(handlers::chat::delete))
        .route("/chats/{id}/messages", post(handlers::message::send))
        .route("/chats/{id}/messages", get(handlers::message::list))
        .route(
            "/chats/{id}/messages/{message_id}",
            put(handlers::message::update),
        )
        .route(
            "/chats/{id}/messages/{message_id}",
            delete(handlers::message::delete),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Build CORS layer from configuration
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new().allow_headers(Any);

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors.allow_methods(methods)
}
