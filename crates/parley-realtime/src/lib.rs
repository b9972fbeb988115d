//! # parley-realtime
//!
//! Real-time WebSocket engine for Parley. Provides:
//!
//! - WebSocket connection management with JWT authentication
//! - Per-user presence tracking across multiple concurrent connections
//! - Chat rooms (broadcast groups keyed by chat id)
//! - Inbound event routing (receipts, typing) and outbound broadcast
//!   entry points for the HTTP layer
//! - Missed-message replay on the offline-to-online transition

pub mod connection;
pub mod events;
pub mod presence;
pub mod replay;
pub mod room;
pub mod server;
pub mod store;

pub use connection::authenticator::ConnectionAuthenticator;
pub use connection::manager::ConnectionManager;
pub use events::{InboundEvent, OutboundEvent};
pub use presence::registry::PresenceRegistry;
pub use replay::MessageReplayer;
pub use room::registry::RoomRegistry;
pub use server::RealtimeEngine;
