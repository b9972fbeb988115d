//! # parley-auth
//!
//! Credential handling for Parley: JWT access/refresh token issuance and
//! validation, plus Argon2id password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair};
pub use password::PasswordHasher;
