//! Chat rooms: broadcast groups of connections keyed by chat id.

pub mod registry;
pub mod room;
