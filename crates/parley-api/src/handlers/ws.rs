//! WebSocket upgrade handler.
//!
//! The access token rides on the query string because browsers cannot set
//! headers on WebSocket handshakes. Authentication happens before the
//! upgrade; a bad token never reaches the socket loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use parley_realtime::connection::authenticator::ConnectionIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WebSocket handshake.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
pub async fn upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let identity = state
        .realtime
        .authenticator
        .authenticate(query.token.as_deref())?;

    Ok(ws.on_upgrade(move |socket| run_connection(state, identity, socket)))
}

/// Drives one established WebSocket connection to completion.
async fn run_connection(state: AppState, identity: ConnectionIdentity, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx, came_online) = state.realtime.connections.register(
        identity.user_id,
        identity.role,
        identity.username,
    );
    let conn_id = handle.id;

    // Forward queued outbound frames to the client. Must be draining
    // before replay starts, or a large backlog would overrun the buffer.
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // First connection for this user: push everything they missed.
    if came_online {
        state.realtime.replayer.replay(&handle).await;
    }

    let mut shutdown_rx = state.realtime.shutdown_receiver();

    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        state.realtime.connections.handle_inbound(conn_id, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    outbound_task.abort();
    state.realtime.connections.unregister(conn_id).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
