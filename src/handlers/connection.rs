//! Transport connection handlers

use crate::handlers::lobby::remove_from_lobby;
use crate::protocol::ServerMessage;
use crate::state::{AppState, PeerSession};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Registers a new WebSocket connection and hands the client its
/// server-assigned connection id.
pub async fn handle_connection(
    state: Arc<AppState>,
    sender: UnboundedSender<ServerMessage>,
) -> String {
    let connection_id = Uuid::new_v4().to_string();
    state
        .peers
        .insert(connection_id.clone(), PeerSession::new(sender.clone()));

    let _ = sender.send(ServerMessage::Connected {
        connection_id: connection_id.clone(),
    });

    tracing::info!(connection_id = %connection_id, "New connection established");
    connection_id
}

/// Handles an abrupt transport disconnect. The event carries only the
/// connection id; the participant identity comes from the connection
/// index. An unresolved identity degrades to a no-op member removal,
/// which still detaches the connection from the lobby's channel.
pub async fn handle_disconnect(state: &Arc<AppState>, connection_id: &str) {
    if let Some((_, session)) = state.peers.remove(connection_id) {
        let lobby_id = session.lobby_id.read().await.clone();
        if let Some(lobby_id) = lobby_id {
            let member_id = state.connections.resolve(connection_id).unwrap_or_else(|| {
                tracing::warn!(
                    connection_id = %connection_id,
                    lobby_id = %lobby_id,
                    "Disconnect with no bound identity"
                );
                String::new()
            });
            remove_from_lobby(state, connection_id, &lobby_id, &member_id).await;
        }
    }
    state.connections.unbind(connection_id);
    tracing::info!(connection_id = %connection_id, "Connection closed");
}
