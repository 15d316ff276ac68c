//! Key-value persistence contract for player records

use crate::error::Result;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// External record store keyed by player identifier
///
/// Values are serialised [`PlayerRecord`](crate::player::PlayerRecord)s.
/// Implementations make no transactional promise; callers that need
/// read-modify-write atomicity must serialise access per key themselves
/// (see [`PlayerLocks`](super::PlayerLocks)).
pub trait PersistenceGateway: Send + Sync {
    /// Fetch the stored record, `None` for an unseen player
    fn get(&self, player_id: &str) -> Result<Option<String>>;

    /// Store (overwrite) the record for a player
    fn set(&self, player_id: &str, record: String) -> Result<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
    fn get(&self, player_id: &str) -> Result<Option<String>> {
        (**self).get(player_id)
    }

    fn set(&self, player_id: &str, record: String) -> Result<()> {
        (**self).set(player_id, record)
    }
}

/// In-process store, also used as the per-service fallback
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: RwLock<AHashMap<String, String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a stored record, returning it if present
    pub fn remove(&self, player_id: &str) -> Option<String> {
        self.records.write().remove(player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.records.read().contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn get(&self, player_id: &str) -> Result<Option<String>> {
        Ok(self.records.read().get(player_id).cloned())
    }

    fn set(&self, player_id: &str, record: String) -> Result<()> {
        self.records.write().insert(player_id.to_string(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unseen_is_none() {
        let store = MemoryGateway::new();
        assert_eq!(store.get("player_1").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryGateway::new();
        store.set("player_1", "a".to_string()).unwrap();
        store.set("player_1", "b".to_string()).unwrap();

        assert_eq!(store.get("player_1").unwrap().as_deref(), Some("b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = MemoryGateway::new();
        store.set("player_1", "a".to_string()).unwrap();

        assert_eq!(store.remove("player_1").as_deref(), Some("a"));
        assert!(!store.contains("player_1"));
        assert_eq!(store.remove("player_1"), None);
    }

    #[test]
    fn test_shared_through_arc() {
        let store = Arc::new(MemoryGateway::new());
        let handle: Arc<MemoryGateway> = Arc::clone(&store);

        handle.set("player_1", "x".to_string()).unwrap();
        assert!(store.contains("player_1"));
    }
}
