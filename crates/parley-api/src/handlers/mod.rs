//! HTTP and WebSocket request handlers.

pub mod auth;
pub mod chat;
pub mod health;
pub mod message;
pub mod user;
pub mod ws;
