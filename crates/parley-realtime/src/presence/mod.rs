//! Presence tracking: which users are online, and over which connections.

pub mod registry;
