//! # parley-api
//!
//! HTTP and WebSocket surface for Parley, built on Axum. REST routes
//! cover accounts, authentication, chats, and messages; `/ws` upgrades to
//! the realtime engine. Message mutations are broadcast to the affected
//! chat room after the database write succeeds.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
