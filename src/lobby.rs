//! Lobby entity: membership, capacity and ownership invariants

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on lobby membership. Sessions are strictly two-party.
pub const LOBBY_CAPACITY: usize = 2;

/// A participant inside a lobby. Has no lifecycle of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub member_id: String,
    pub member_name: String,
}

impl Member {
    pub fn new(member_id: impl Into<String>, member_name: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            member_name: member_name.into(),
        }
    }
}

/// Membership mutation failures. `DuplicateMember` is reported before
/// `Full` so callers can tell a re-join apart from a genuine overflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("lobby is full")]
    Full,
    #[error("member is already in the lobby")]
    DuplicateMember,
}

/// A two-party session container. Serialized whole as the
/// `lobbyStatusChanged` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    pub lobby_id: String,
    pub lobby_name: String,
    pub owner_id: Option<String>,
    pub members: Vec<Member>,
}

impl Lobby {
    pub fn new(lobby_id: impl Into<String>, lobby_name: impl Into<String>) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            lobby_name: lobby_name.into(),
            owner_id: None,
            members: Vec::with_capacity(LOBBY_CAPACITY),
        }
    }

    /// Appends a member in arrival order. The first member to join
    /// becomes owner.
    pub fn add_member(&mut self, member: Member) -> Result<(), LobbyError> {
        if self.has_member(&member.member_id) {
            return Err(LobbyError::DuplicateMember);
        }
        if self.is_full() {
            return Err(LobbyError::Full);
        }
        if self.owner_id.is_none() {
            self.owner_id = Some(member.member_id.clone());
        }
        self.members.push(member);
        Ok(())
    }

    /// Removes a member if present; absent identities are a no-op.
    /// Ownership passes to the first remaining member when the owner
    /// departs, and is unset when the lobby empties.
    pub fn remove_member(&mut self, member_id: &str) {
        self.members.retain(|m| m.member_id != member_id);
        if self.owner_id.as_deref() == Some(member_id) {
            self.owner_id = self.members.first().map(|m| m.member_id.clone());
        }
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= LOBBY_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.member_id == member_id)
    }

    pub fn member_mut(&mut self, member_id: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.member_id == member_id)
    }
}
