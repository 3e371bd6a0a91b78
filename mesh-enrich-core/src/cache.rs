//! Top-level tree code label cache.
//!
//! Maps a top-level code (`D27`) to the label of the descriptor at that
//! exact tree position, or to "no label". The key space is the handful of
//! top-level branches in MeSH, so the cache is bounded but never evicts:
//! once `capacity` entries are stored, further codes are answered by the
//! caller without being remembered.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Default number of codes kept.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Concurrent, insert-only label cache.
pub struct TopLevelLabelCache {
    inner: RwLock<HashMap<String, Option<String>>>,
    capacity: usize,
}

impl TopLevelLabelCache {
    /// Create a cache holding at most `capacity` codes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Cached outcome for `code`.
    ///
    /// The outer `Option` is presence in the cache; the inner one is the
    /// label itself (`None` = known to have no distinct label).
    pub fn get(&self, code: &str) -> Option<Option<String>> {
        self.inner.read().get(code).cloned()
    }

    /// Record the outcome for `code`. Returns `false` when the cache is full
    /// and the code was not already present.
    ///
    /// Overwrites an existing entry; concurrent lookups of the same code
    /// resolve to the same answer, so the last writer winning is harmless.
    pub fn insert(&self, code: &str, label: Option<String>) -> bool {
        let mut map = self.inner.write();
        if map.len() >= self.capacity && !map.contains_key(code) {
            return false;
        }
        map.insert(code.to_string(), label);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TopLevelLabelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for TopLevelLabelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopLevelLabelCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
