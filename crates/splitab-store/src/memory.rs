use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use splitab_core::{AbError, KeyValueStore};

#[derive(Debug, Default)]
struct MemoryState {
    sets: BTreeMap<String, BTreeSet<String>>,
    counters: BTreeMap<String, u64>,
}

/// In-process store shared between threads through an `Arc`.
///
/// Every operation takes the single lock once, so each call is atomic with
/// respect to the others, matching the per-operation guarantee of a networked
/// store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, key: &str) -> Result<MutexGuard<'_, MemoryState>, AbError> {
        self.state
            .lock()
            .map_err(|err| AbError::store("splitab_store.memory_poisoned", key, err))
    }
}

impl KeyValueStore for MemoryStore {
    fn set_add(&self, key: &str, member: &str) -> Result<(), AbError> {
        let mut state = self.lock(key)?;
        state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AbError> {
        let state = self.lock(key)?;
        Ok(state
            .sets
            .get(key)
            .map(|members| members.contains(member))
            .unwrap_or(false))
    }

    fn set_cardinality(&self, key: &str) -> Result<u64, AbError> {
        let state = self.lock(key)?;
        Ok(state.sets.get(key).map(|members| members.len() as u64).unwrap_or(0))
    }

    fn counter_increment(&self, key: &str) -> Result<u64, AbError> {
        let mut state = self.lock(key)?;
        let value = state.counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    fn counter_get(&self, key: &str) -> Result<u64, AbError> {
        let state = self.lock(key)?;
        Ok(state.counters.get(key).copied().unwrap_or(0))
    }

    fn delete(&self, key: &str) -> Result<(), AbError> {
        let mut state = self.lock(key)?;
        state.sets.remove(key);
        state.counters.remove(key);
        Ok(())
    }
}
