//! Connection-to-participant index
//!
//! Back-reference used to clean up membership on abrupt disconnects: a
//! transport connection maps to the participant identity it last
//! declared. No ownership implied; cleared independently of any lobby.

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct ConnectionIndex {
    bindings: DashMap<String, String>,
}

impl ConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identity a connection speaks for, replacing any
    /// prior binding.
    pub fn bind(&self, connection_id: &str, member_id: &str) {
        self.bindings
            .insert(connection_id.to_string(), member_id.to_string());
    }

    pub fn resolve(&self, connection_id: &str) -> Option<String> {
        self.bindings.get(connection_id).map(|id| id.value().clone())
    }

    /// Removes the binding; absent connections are a no-op.
    pub fn unbind(&self, connection_id: &str) {
        self.bindings.remove(connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_then_resolve() {
        let index = ConnectionIndex::new();
        index.bind("c1", "u1");
        assert_eq!(index.resolve("c1").as_deref(), Some("u1"));
        assert_eq!(index.resolve("c2"), None);
    }

    #[test]
    fn rebind_overwrites() {
        let index = ConnectionIndex::new();
        index.bind("c1", "u1");
        index.bind("c1", "u2");
        assert_eq!(index.resolve("c1").as_deref(), Some("u2"));
    }

    #[test]
    fn unbind_is_idempotent() {
        let index = ConnectionIndex::new();
        index.bind("c1", "u1");
        index.unbind("c1");
        assert_eq!(index.resolve("c1"), None);
        index.unbind("c1");
    }
}
