//! Chat conversation entity.

pub mod model;

pub use model::{Chat, CreateChat};
