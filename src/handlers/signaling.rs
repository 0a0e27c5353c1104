//! WebRTC negotiation relay
//!
//! Negotiation payloads are opaque: they are forwarded to the other
//! side of the lobby without being inspected. Malformed events are
//! dropped and logged; the event channel has no failure path back to
//! the sender.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Relays an offer to every other connection in the lobby's channel.
pub async fn handle_offer(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    offer: Value,
    user_id: &str,
) {
    if !negotiation_event_valid(lobby_id, &offer, user_id) {
        tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Dropped malformed offer");
        return;
    }
    relay_negotiation(
        state,
        connection_id,
        lobby_id,
        ServerMessage::IncomingOffer { offer },
    )
    .await;
    tracing::debug!(from = %user_id, lobby_id = %lobby_id, "Relayed offer");
}

/// Relays an answer to every other connection in the lobby's channel.
pub async fn handle_answer(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    answer: Value,
    user_id: &str,
) {
    if !negotiation_event_valid(lobby_id, &answer, user_id) {
        tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Dropped malformed answer");
        return;
    }
    relay_negotiation(
        state,
        connection_id,
        lobby_id,
        ServerMessage::IncomingAnswer { answer },
    )
    .await;
    tracing::debug!(from = %user_id, lobby_id = %lobby_id, "Relayed answer");
}

/// Relays an ICE candidate to every other connection in the lobby's
/// channel.
pub async fn handle_ice_candidate(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    candidate: Value,
    user_id: &str,
) {
    if !negotiation_event_valid(lobby_id, &candidate, user_id) {
        tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Dropped malformed ICE candidate");
        return;
    }
    relay_negotiation(
        state,
        connection_id,
        lobby_id,
        ServerMessage::IceCandidate { candidate },
    )
    .await;
    tracing::debug!(from = %user_id, lobby_id = %lobby_id, "Relayed ICE candidate");
}

/// Lobby id, payload and sender identity must all be present and
/// non-empty before a negotiation event is relayed.
fn negotiation_event_valid(lobby_id: &str, payload: &Value, user_id: &str) -> bool {
    if lobby_id.trim().is_empty() || user_id.trim().is_empty() {
        return false;
    }
    match payload {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

async fn relay_negotiation(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    message: ServerMessage,
) {
    let Some(entry) = state.registry.get(lobby_id) else {
        tracing::warn!(lobby_id = %lobby_id, "Dropped negotiation event for unknown lobby");
        return;
    };
    let channel = entry.read().await.channel().to_vec();
    relay_to_others(state, &channel, connection_id, message);
}

/// Delivers to one specific connection.
pub(crate) fn send_to_connection(state: &AppState, connection_id: &str, message: ServerMessage) {
    if let Some(session) = state.peers.get(connection_id) {
        let _ = session.sender.send(message);
    }
}

/// Delivers to every connection in the channel, sender included.
pub(crate) fn broadcast_to_channel(state: &AppState, channel: &[String], message: ServerMessage) {
    for connection_id in channel {
        send_to_connection(state, connection_id, message.clone());
    }
}

/// Delivers to every connection in the channel except the sender's.
pub(crate) fn relay_to_others(
    state: &AppState,
    channel: &[String],
    except_connection_id: &str,
    message: ServerMessage,
) {
    for connection_id in channel {
        if connection_id != except_connection_id {
            send_to_connection(state, connection_id, message.clone());
        }
    }
}
