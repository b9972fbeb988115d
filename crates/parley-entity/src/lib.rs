//! # parley-entity
//!
//! Domain entity models for Parley. Plain data structs with `serde` and
//! `sqlx::FromRow` derives; behavior lives in the service and realtime
//! crates.

pub mod chat;
pub mod message;
pub mod token;
pub mod user;

pub use chat::Chat;
pub use message::{Message, MessageStatus};
pub use token::RefreshToken;
pub use user::{User, UserRole};
