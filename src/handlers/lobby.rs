//! Lobby lifecycle handlers: join, leave, reclamation
//!
//! All membership mutation for a lobby happens under its entry's write
//! lock; fan-out happens after the lock is released, against a snapshot
//! of the channel taken before the departing connection was detached so
//! the departing side still receives the authoritative snapshot.

use crate::handlers::signaling::{broadcast_to_channel, send_to_connection};
use crate::lobby::{LobbyError, Member};
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

/// Handles a `joinLobby` event. A join by an identity that is already
/// a member is a reconnect: no structural change, but the connection is
/// re-bound and the snapshot re-broadcast. A connection speaks for one
/// lobby at a time; successfully joining a different lobby ends its
/// membership in the previous one.
pub async fn handle_join_lobby(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    user_id: &str,
    user_name: Option<&str>,
) {
    let lobby_id = lobby_id.trim();
    if lobby_id.is_empty() || user_id.trim().is_empty() {
        tracing::warn!(connection_id = %connection_id, "Dropped join with missing fields");
        return;
    }

    let Some(entry) = state.registry.get(lobby_id) else {
        tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Join for unknown lobby dropped");
        return;
    };

    let snapshot;
    let channel;
    {
        let mut entry = entry.write().await;
        // The lobby may have been reclaimed between the registry lookup
        // and acquiring the lock; a late join must not resurrect it.
        if !state.registry.exists(lobby_id) {
            tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Join raced reclamation, dropped");
            return;
        }
        if entry.lobby.has_member(user_id) {
            // Display names are mutable only by their own participant.
            if let (Some(name), Some(member)) = (user_name, entry.lobby.member_mut(user_id)) {
                member.member_name = name.to_string();
            }
            tracing::info!(lobby_id = %lobby_id, user_id = %user_id, "Member reconnected");
        } else {
            let name = user_name.unwrap_or(user_id);
            match entry.lobby.add_member(Member::new(user_id, name)) {
                Ok(()) => {
                    tracing::info!(lobby_id = %lobby_id, user_id = %user_id, "Member joined");
                }
                Err(LobbyError::Full) => {
                    tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Join rejected, lobby full");
                    return;
                }
                Err(LobbyError::DuplicateMember) => {
                    // Unreachable: membership was checked above.
                    return;
                }
            }
        }
        entry.attach_connection(connection_id);
        snapshot = entry.lobby.clone();
        channel = entry.channel().to_vec();
    }

    // Pull the connection out of the lobby it was in before, under the
    // identity it declared there, before re-binding.
    let previous = match state.peers.get(connection_id) {
        Some(session) => session.lobby_id.read().await.clone(),
        None => None,
    };
    if let Some(previous) = previous.filter(|p| p != lobby_id) {
        let member_id = state.connections.resolve(connection_id).unwrap_or_default();
        remove_from_lobby(state, connection_id, &previous, &member_id).await;
    }

    state.connections.bind(connection_id, user_id);
    if let Some(session) = state.peers.get(connection_id) {
        *session.lobby_id.write().await = Some(lobby_id.to_string());
    }

    broadcast_to_channel(
        state,
        &channel,
        ServerMessage::LobbyStatusChanged { lobby: snapshot },
    );
    send_to_connection(
        state,
        connection_id,
        ServerMessage::LobbyJoined {
            lobby_id: lobby_id.to_string(),
            user_id: user_id.to_string(),
        },
    );
}

/// Handles an explicit `leaveLobby` event. The connection's binding
/// and lobby pointer are only cleared when the leave actually applied
/// to the lobby this session is in; a leave naming an unknown or
/// unrelated lobby must not blind later disconnect cleanup.
pub async fn handle_leave_lobby(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    user_id: &str,
) {
    if !remove_from_lobby(state, connection_id, lobby_id, user_id).await {
        return;
    }
    if let Some(session) = state.peers.get(connection_id) {
        let mut current = session.lobby_id.write().await;
        if current.as_deref() == Some(lobby_id) {
            *current = None;
            state.connections.unbind(connection_id);
        }
    }
}

/// Removes a member from a lobby, broadcasts the updated snapshot, and
/// reclaims the lobby if it emptied. Shared by explicit leaves,
/// transport disconnects and lobby switches; an empty `user_id`
/// removes nothing but still detaches the connection from the channel.
/// Returns whether the lobby existed and the removal ran.
pub(super) async fn remove_from_lobby(
    state: &Arc<AppState>,
    connection_id: &str,
    lobby_id: &str,
    user_id: &str,
) -> bool {
    let Some(entry) = state.registry.get(lobby_id) else {
        tracing::warn!(lobby_id = %lobby_id, user_id = %user_id, "Leave for unknown lobby dropped");
        return false;
    };

    let snapshot;
    let channel;
    let reclaim;
    {
        let mut entry = entry.write().await;
        entry.lobby.remove_member(user_id);
        // Channel snapshot taken before detaching so the departing
        // connection still receives the final broadcasts.
        channel = entry.channel().to_vec();
        entry.detach_connection(connection_id);
        snapshot = entry.lobby.clone();
        reclaim = entry.lobby.is_empty();
        if reclaim {
            // Deleted while the entry lock is held, so a join that
            // already fetched this entry cannot repopulate a lobby the
            // registry no longer knows.
            state.registry.delete(lobby_id);
        }
    }

    broadcast_to_channel(
        state,
        &channel,
        ServerMessage::LobbyStatusChanged {
            lobby: snapshot.clone(),
        },
    );

    tracing::info!(
        lobby_id = %lobby_id,
        user_id = %user_id,
        remaining = snapshot.members.len(),
        owner = ?snapshot.owner_id,
        "Member left lobby"
    );

    if reclaim {
        broadcast_to_channel(
            state,
            &channel,
            ServerMessage::LobbyDeleted {
                lobby_id: lobby_id.to_string(),
            },
        );
        tracing::info!(lobby_id = %lobby_id, "Lobby reclaimed");
    }
    true
}
