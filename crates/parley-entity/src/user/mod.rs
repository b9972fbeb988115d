//! User entity and role.

pub mod model;
pub mod role;

pub use model::{CreateUser, PublicUser, UpdateUser, User};
pub use role::UserRole;
