//! Per-player mutual exclusion for read-modify-write cycles

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// One lock per player identifier
///
/// Actions for the same player run one at a time; actions for different
/// players never contend beyond the brief slot lookup. A slot lives only
/// while some caller holds or waits for it, so the map stays bounded by the
/// number of players currently being served.
#[derive(Debug, Default)]
pub struct PlayerLocks {
    slots: Mutex<AHashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `player_id`
    pub fn with_lock<T>(&self, player_id: &str, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(player_id);
        let value = {
            let _guard = slot.lock();
            f()
        };
        self.release(player_id, &slot);
        value
    }

    fn slot(&self, player_id: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(player_id.to_string()).or_default())
    }

    /// Drop the slot once no other caller holds a handle to it
    fn release(&self, player_id: &str, slot: &Arc<Mutex<()>>) {
        let mut slots = self.slots.lock();
        // handles are only cloned under the map lock: one in the map, one here
        if Arc::strong_count(slot) == 2 {
            slots.remove(player_id);
        }
    }

    /// Number of identities currently locked or waiting
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
