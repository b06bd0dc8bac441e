//! Caching directory service configuration.

use std::time::Duration;

use dircache_core::{CacheKind, RecordType, Settings};

/// Values the caching directory service needs, derived from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    /// Staleness threshold for cached records and negative entries.
    ttl: Duration,
    /// Known record types, in lookup order.
    record_types: Vec<RecordType>,
    /// Record cache implementation.
    cache_kind: CacheKind,
}

impl DirectoryConfig {
    /// Creates a configuration with the default record cache.
    pub fn new(ttl: Duration, record_types: Vec<RecordType>) -> Self {
        Self {
            ttl,
            record_types,
            cache_kind: CacheKind::default(),
        }
    }

    /// Derives the configuration from deployment settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ttl: settings.cache_ttl(),
            record_types: settings.record_types.clone(),
            cache_kind: settings.cache_kind,
        }
    }

    /// Sets the record cache implementation.
    pub fn with_cache_kind(mut self, cache_kind: CacheKind) -> Self {
        self.cache_kind = cache_kind;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn record_types(&self) -> &[RecordType] {
        &self.record_types
    }

    pub fn cache_kind(&self) -> CacheKind {
        self.cache_kind
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
