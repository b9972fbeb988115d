//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use parley_core::types::UserId;
use parley_entity::user::role::UserRole;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's outbound channel plus cached
/// user metadata. The socket task owns the receiver half and forwards
/// frames to the client.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// User's role (cached for quick checks)
    pub user_role: UserRole,
    /// Username (cached for logging)
    pub username: String,
    /// Sender for outbound JSON frames
    pub sender: mpsc::Sender<String>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    pub alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(
        user_id: UserId,
        user_role: UserRole,
        username: String,
        sender: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            user_role,
            username,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Push a frame to this connection without blocking. A full buffer
    /// drops the frame; a closed channel marks the connection dead.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Connection {} send buffer full, dropping frame", self.id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Push a frame, waiting for buffer space. Used on the replay path,
    /// where a backlog can exceed the buffer and dropped frames would lose
    /// missed messages. A closed channel marks the connection dead.
    pub async fn send_queued(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.send(frame).await {
            Ok(()) => true,
            Err(_) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with_buffer(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = ConnectionHandle::new(UserId::new(), UserRole::User, "alice".into(), tx);
        (handle, rx)
    }

    #[tokio::test]
    async fn send_delivers_frame() {
        let (handle, mut rx) = handle_with_buffer(4);
        assert!(handle.send("hello".into()));
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn full_buffer_drops_frame() {
        let (handle, _rx) = handle_with_buffer(1);
        assert!(handle.send("first".into()));
        assert!(!handle.send("second".into()));
        // A dropped frame does not kill the connection.
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn queued_send_waits_for_capacity() {
        let (handle, mut rx) = handle_with_buffer(1);
        let handle = std::sync::Arc::new(handle);

        let sender = {
            let handle = handle.clone();
            tokio::spawn(async move {
                assert!(handle.send_queued("first".into()).await);
                assert!(handle.send_queued("second".into()).await);
            })
        };

        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
        sender.await.unwrap();
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn queued_send_to_closed_receiver_marks_dead() {
        let (handle, rx) = handle_with_buffer(1);
        drop(rx);
        assert!(!handle.send_queued("lost".into()).await);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn closed_receiver_marks_dead() {
        let (handle, rx) = handle_with_buffer(1);
        drop(rx);
        assert!(!handle.send("lost".into()));
        assert!(!handle.is_alive());
    }
}
