//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use parley_auth::jwt::decoder::JwtDecoder;
use parley_auth::jwt::encoder::JwtEncoder;
use parley_auth::password::hasher::PasswordHasher;
use parley_core::config::AppConfig;
use parley_database::repositories::chat::ChatRepository;
use parley_database::repositories::message::MessageRepository;
use parley_database::repositories::refresh_token::RefreshTokenRepository;
use parley_database::repositories::user::UserRepository;
use parley_realtime::server::RealtimeEngine;
use parley_service::auth::AuthService;
use parley_service::chat::ChatService;
use parley_service::message::MessageService;
use parley_service::user::UserService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    /// Authentication service
    pub auth_service: Arc<AuthService>,
    /// User profile service
    pub user_service: Arc<UserService>,
    /// Chat service
    pub chat_service: Arc<ChatService>,
    /// Message service
    pub message_service: Arc<MessageService>,

    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Wires repositories, services, and the realtime engine from a
    /// configuration and database pool.
    pub fn build(config: AppConfig, db_pool: PgPool) -> Self {
        let config = Arc::new(config);

        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let chat_repo = Arc::new(ChatRepository::new(db_pool.clone()));
        let message_repo = Arc::new(MessageRepository::new(db_pool.clone()));
        let token_repo = Arc::new(RefreshTokenRepository::new(db_pool.clone()));

        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let hasher = Arc::new(PasswordHasher::new());

        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            token_repo,
            jwt_encoder,
            jwt_decoder.clone(),
            hasher,
            &config.auth,
        ));
        let user_service = Arc::new(UserService::new(user_repo.clone()));
        let chat_service = Arc::new(ChatService::new(chat_repo.clone(), user_repo.clone()));
        let message_service = Arc::new(MessageService::new(
            message_repo.clone(),
            chat_repo.clone(),
        ));

        let realtime = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            parley_realtime::ConnectionAuthenticator::new(jwt_decoder.clone()),
            chat_repo,
            message_repo,
            user_repo,
        ));

        Self {
            config,
            db_pool,
            jwt_decoder,
            auth_service,
            user_service,
            chat_service,
            message_service,
            realtime,
        }
    }
}
