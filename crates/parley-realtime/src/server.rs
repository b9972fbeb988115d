//! Top-level realtime engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use parley_core::config::realtime::RealtimeConfig;
use parley_core::result::AppResult;

use crate::connection::authenticator::ConnectionAuthenticator;
use crate::connection::manager::ConnectionManager;
use crate::presence::registry::PresenceRegistry;
use crate::replay::MessageReplayer;
use crate::room::registry::RoomRegistry;
use crate::store::{ChatStore, MessageStore, UserStore};

/// Central realtime engine coordinating connections, presence, rooms,
/// and missed-message replay.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager and event router.
    pub connections: Arc<ConnectionManager>,
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Handshake authenticator.
    pub authenticator: ConnectionAuthenticator,
    /// Missed-message replayer.
    pub replayer: Arc<MessageReplayer>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new realtime engine over the given stores.
    pub fn new(
        config: RealtimeConfig,
        authenticator: ConnectionAuthenticator,
        chats: Arc<dyn ChatStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let presence = Arc::new(PresenceRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config,
            presence.clone(),
            rooms.clone(),
            chats.clone(),
            messages.clone(),
            users,
        ));
        let replayer = Arc::new(MessageReplayer::new(chats, messages));

        info!("Realtime engine initialized");

        Self {
            connections,
            presence,
            rooms,
            authenticator,
            replayer,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the realtime engine.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down realtime engine");

        // Signal all socket tasks to stop
        let _ = self.shutdown_tx.send(());

        // Drop every connection without presence broadcasts
        self.connections.close_all();

        info!("Realtime engine shut down");
        Ok(())
    }
}
