//! Negative result cache.

use std::collections::HashMap;
use std::time::Duration;

use dircache_core::IndexKind;
use parking_lot::RwLock;
use tokio::time::Instant;

/// Remembers keys the backend recently failed to resolve.
///
/// One map per index kind, from key to the time of the last failed
/// resolution. Entries older than the TTL no longer suppress backend
/// queries but are not removed; a later miss overwrites the timestamp.
#[derive(Debug)]
pub struct NegativeCache {
    disabled_keys: RwLock<HashMap<IndexKind, HashMap<String, Instant>>>,
}

impl NegativeCache {
    pub fn new() -> Self {
        Self {
            disabled_keys: RwLock::new(
                IndexKind::ALL
                    .iter()
                    .map(|kind| (*kind, HashMap::new()))
                    .collect(),
            ),
        }
    }

    /// Returns true if `key` failed to resolve less than `ttl` before `now`.
    pub fn is_suppressed(&self, index: IndexKind, key: &str, ttl: Duration, now: Instant) -> bool {
        self.disabled_keys
            .read()
            .get(&index)
            .and_then(|keys| keys.get(key))
            .is_some_and(|disabled_at| now.saturating_duration_since(*disabled_at) < ttl)
    }

    /// Records a failed resolution of `key` at `now`.
    pub fn record_miss(&self, index: IndexKind, key: &str, now: Instant) {
        self.disabled_keys
            .write()
            .entry(index)
            .or_default()
            .insert(key.to_string(), now);
    }

    /// Time of the last failed resolution of `key`, if any.
    pub fn disabled_at(&self, index: IndexKind, key: &str) -> Option<Instant> {
        self.disabled_keys
            .read()
            .get(&index)
            .and_then(|keys| keys.get(key))
            .copied()
    }

    /// Total number of remembered keys, stale ones included.
    pub fn len(&self) -> usize {
        self.disabled_keys.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NegativeCache {
    fn default() -> Self {
        Self::new()
    }
}
