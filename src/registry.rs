//! Process-wide lobby registry and identifier generation

use crate::lobby::{Lobby, Member};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Fixed length of a lobby identifier. 62 alphanumerics at length 10
/// gives ~2^59 combinations, enough to treat collisions as negligible,
/// and the result embeds directly in a URL path segment.
pub const LOBBY_ID_LEN: usize = 10;

/// Name used when a creation request omits one.
pub const DEFAULT_LOBBY_NAME: &str = "Default Lobby";

const CREATE_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not allocate a unique lobby identifier")]
    IdExhausted,
}

/// A registered lobby plus its channel: the connection ids currently
/// attached to it. Membership and channel mutate under one lock so all
/// mutation for a given lobby is serialized.
#[derive(Debug)]
pub struct LobbyEntry {
    pub lobby: Lobby,
    channel: Vec<String>,
}

impl LobbyEntry {
    fn new(lobby: Lobby) -> Self {
        Self {
            lobby,
            channel: Vec::new(),
        }
    }

    /// Attaches a connection to the lobby's channel; already-attached
    /// connections are left in place.
    pub fn attach_connection(&mut self, connection_id: &str) {
        if !self.channel.iter().any(|c| c == connection_id) {
            self.channel.push(connection_id.to_string());
        }
    }

    pub fn detach_connection(&mut self, connection_id: &str) {
        self.channel.retain(|c| c != connection_id);
    }

    pub fn channel(&self) -> &[String] {
        &self.channel
    }
}

/// Mapping from lobby identifier to lobby, scoped to the process.
/// Constructed once at startup and handed to the handlers by reference,
/// never a global.
#[derive(Debug, Default)]
pub struct LobbyRegistry {
    entries: DashMap<String, Arc<RwLock<LobbyEntry>>>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and stores a lobby with the creator pre-added as sole
    /// member and owner, returning its identifier.
    pub fn create(
        &self,
        lobby_name: &str,
        creator: Member,
    ) -> Result<(String, Arc<RwLock<LobbyEntry>>), RegistryError> {
        let lobby_id = self.generate_id()?;
        let mut lobby = Lobby::new(lobby_id.clone(), lobby_name);
        // A fresh lobby cannot be full or contain the creator already.
        let _ = lobby.add_member(creator);
        let entry = Arc::new(RwLock::new(LobbyEntry::new(lobby)));
        self.entries.insert(lobby_id.clone(), entry.clone());
        Ok((lobby_id, entry))
    }

    pub fn get(&self, lobby_id: &str) -> Option<Arc<RwLock<LobbyEntry>>> {
        self.entries.get(lobby_id).map(|e| e.value().clone())
    }

    pub fn exists(&self, lobby_id: &str) -> bool {
        self.entries.contains_key(lobby_id)
    }

    /// Removes the entry; absent identifiers are a no-op.
    pub fn delete(&self, lobby_id: &str) {
        self.entries.remove(lobby_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn generate_id(&self) -> Result<String, RegistryError> {
        for _ in 0..CREATE_ATTEMPTS {
            let candidate: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(LOBBY_ID_LEN)
                .map(char::from)
                .collect();
            if !self.exists(&candidate) {
                return Ok(candidate);
            }
        }
        Err(RegistryError::IdExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_stores_lobby_with_creator_as_owner() {
        let registry = LobbyRegistry::new();
        let (lobby_id, entry) = registry
            .create("My Lobby", Member::new("u1", "Alice"))
            .unwrap();

        assert_eq!(lobby_id.len(), LOBBY_ID_LEN);
        assert!(lobby_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(registry.exists(&lobby_id));

        let entry = entry.read().await;
        assert_eq!(entry.lobby.lobby_name, "My Lobby");
        assert_eq!(entry.lobby.owner_id.as_deref(), Some("u1"));
        assert_eq!(entry.lobby.members.len(), 1);
    }

    #[test]
    fn get_unknown_lobby_is_absent() {
        let registry = LobbyRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(!registry.exists("nope"));
    }

    #[test]
    fn delete_removes_entry_and_is_idempotent() {
        let registry = LobbyRegistry::new();
        let (lobby_id, _) = registry
            .create(DEFAULT_LOBBY_NAME, Member::new("u1", "Alice"))
            .unwrap();
        registry.delete(&lobby_id);
        assert!(registry.get(&lobby_id).is_none());
        registry.delete(&lobby_id);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn channel_attach_is_deduplicated() {
        let registry = LobbyRegistry::new();
        let (_, entry) = registry
            .create(DEFAULT_LOBBY_NAME, Member::new("u1", "Alice"))
            .unwrap();
        let mut entry = entry.write().await;
        entry.attach_connection("c1");
        entry.attach_connection("c1");
        entry.attach_connection("c2");
        assert_eq!(entry.channel(), ["c1", "c2"]);
        entry.detach_connection("c1");
        assert_eq!(entry.channel(), ["c2"]);
        entry.detach_connection("c1");
        assert_eq!(entry.channel(), ["c2"]);
    }

    #[test]
    fn generated_ids_are_unique_across_creates() {
        let registry = LobbyRegistry::new();
        for _ in 0..50 {
            registry
                .create(DEFAULT_LOBBY_NAME, Member::new("u1", "Alice"))
                .unwrap();
        }
        assert_eq!(registry.len(), 50);
    }
}
