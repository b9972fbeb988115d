//! # parley-service
//!
//! Business logic for Parley: account registration and login, token
//! rotation, chat membership management, and message CRUD with
//! sender/participant authorization. Services sit between the HTTP layer
//! and the repositories and are free of any transport concerns.

pub mod auth;
pub mod chat;
pub mod context;
pub mod message;
pub mod user;

pub use context::RequestContext;
