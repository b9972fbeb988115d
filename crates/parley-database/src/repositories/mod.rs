//! Concrete repository implementations.

pub mod chat;
pub mod message;
pub mod refresh_token;
pub mod user;

pub use chat::ChatRepository;
pub use message::MessageRepository;
pub use refresh_token::RefreshTokenRepository;
pub use user::UserRepository;
