//! Shared application state

use crate::config::Config;
use crate::connections::ConnectionIndex;
use crate::protocol::ServerMessage;
use crate::registry::LobbyRegistry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, RwLock};

/// Process-wide state, constructed once in `main` and shared by
/// reference with every handler. Lobby membership is only ever mutated
/// through the lifecycle handlers.
pub struct AppState {
    /// Lobby identifier -> lobby.
    pub registry: LobbyRegistry,
    /// Connection id -> declared participant identity.
    pub connections: ConnectionIndex,
    /// Connection id -> live transport session.
    pub peers: DashMap<String, PeerSession>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            registry: LobbyRegistry::new(),
            connections: ConnectionIndex::new(),
            peers: DashMap::new(),
            config: Arc::new(config),
        }
    }
}

/// One live WebSocket connection.
pub struct PeerSession {
    /// The lobby this connection has joined, if any. Disconnect events
    /// carry no lobby id, so cleanup starts here.
    pub lobby_id: RwLock<Option<String>>,
    pub sender: UnboundedSender<ServerMessage>,
}

impl PeerSession {
    pub fn new(sender: UnboundedSender<ServerMessage>) -> Self {
        Self {
            lobby_id: RwLock::new(None),
            sender,
        }
    }
}
