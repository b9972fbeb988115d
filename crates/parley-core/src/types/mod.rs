//! Shared domain types.

pub mod id;
pub mod pagination;

pub use id::{ChatId, MessageId, UserId};
pub use pagination::{PageRequest, PageResponse};
