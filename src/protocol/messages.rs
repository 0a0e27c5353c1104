//! Client-server message protocol definitions
//!
//! Messages travel as JSON `{"type": ..., "payload": ...}` with
//! camelCase names to match the browser client. Negotiation payloads
//! (offer / answer / candidate) are opaque blobs relayed unmodified.

use crate::lobby::Lobby;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client → server messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    // Lobby Membership
    JoinLobby {
        lobby_id: String,
        user_id: String,
        user_name: Option<String>,
    },
    LeaveLobby {
        lobby_id: String,
        user_id: String,
    },

    // WebRTC Negotiation
    SendOffer {
        lobby_id: String,
        offer: Value,
        user_id: String,
    },
    SendAnswer {
        lobby_id: String,
        answer: Value,
        user_id: String,
    },
    SendIceCandidate {
        lobby_id: String,
        candidate: Value,
        user_id: String,
    },
}

/// Server → client messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    // Connection bootstrap
    Connected {
        connection_id: String,
    },

    // Lobby Events
    LobbyStatusChanged {
        lobby: Lobby,
    },
    LobbyJoined {
        lobby_id: String,
        user_id: String,
    },
    LobbyDeleted {
        lobby_id: String,
    },

    // WebRTC Negotiation
    IncomingOffer {
        offer: Value,
    },
    IncomingAnswer {
        answer: Value,
    },
    IceCandidate {
        candidate: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_join_lobby_deserializes() {
        let raw = r#"{"type":"joinLobby","payload":{"lobbyId":"abc123XYZ0","userId":"u1","userName":"Alice"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        match msg {
            ClientMessage::JoinLobby {
                lobby_id,
                user_id,
                user_name,
            } => {
                assert_eq!(lobby_id, "abc123XYZ0");
                assert_eq!(user_id, "u1");
                assert_eq!(user_name.as_deref(), Some("Alice"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn negotiation_payload_is_passed_through_untouched() {
        let raw = r#"{"type":"sendOffer","payload":{"lobbyId":"abc123XYZ0","offer":{"sdp":"v=0...","type":"offer"},"userId":"u1"}}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        let ClientMessage::SendOffer { offer, .. } = msg else {
            panic!("expected sendOffer");
        };
        assert_eq!(offer["sdp"], "v=0...");

        let out = serde_json::to_value(ServerMessage::IncomingOffer { offer }).unwrap();
        assert_eq!(out["type"], "incomingOffer");
        assert_eq!(out["payload"]["offer"]["type"], "offer");
    }

    #[test]
    fn server_events_use_camel_case_type_tags() {
        let out = serde_json::to_value(ServerMessage::LobbyDeleted {
            lobby_id: "abc123XYZ0".into(),
        })
        .unwrap();
        assert_eq!(out["type"], "lobbyDeleted");
        assert_eq!(out["payload"]["lobbyId"], "abc123XYZ0");
    }
}
