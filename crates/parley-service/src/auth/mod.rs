//! Account registration, login, and refresh token rotation.

pub mod service;

pub use service::{AuthService, AuthTokens};
