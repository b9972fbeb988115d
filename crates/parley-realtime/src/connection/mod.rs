//! WebSocket connection handling: handles, pool, authentication, routing.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod pool;
