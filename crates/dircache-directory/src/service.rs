//! Caching directory service.

use std::sync::Arc;
use std::time::Duration;

use dircache_core::{IndexKind, Record, RecordType, Result};
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{NegativeCache, RecordCache, RecordCaches};
use crate::config::DirectoryConfig;
use crate::metrics::CacheMetrics;
use crate::source::DirectoryQuery;

/// Outcome of one pass over the candidate caches.
enum Lookup {
    Fresh(Arc<Record>),
    Stale,
    Miss,
}

/// Directory service answering record lookups from per-type caches and
/// faulting misses in from a backend.
///
/// A lookup probes the caches of the candidate record types in order and
/// returns the first fresh match. On a miss it consults the negative cache,
/// then asks the backend to populate the caches and probes them once more.
/// A key that is still missing is remembered in the negative cache for one
/// TTL so repeated lookups do not hit the backend again.
///
/// Caches and the negative cache are locked only for the duration of each
/// probe or update; the backend query runs with no lock held.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use dircache_directory::{CachingDirectoryService, DirectoryConfig, StaticDirectory};
/// # #[tokio::main]
/// # async fn main() -> dircache_core::Result<()> {
/// let backend = StaticDirectory::from_path("/etc/dircache/records.yaml")?;
/// let service = CachingDirectoryService::new(DirectoryConfig::default(), Arc::new(backend));
///
/// if let Some(record) = service.record_with_email_address("alice@example.com").await? {
///     println!("found {:?}", record.guid());
/// }
/// # Ok(())
/// # }
/// ```
pub struct CachingDirectoryService {
    ttl: Duration,
    known_types: Vec<RecordType>,
    caches: RecordCaches,
    negative: NegativeCache,
    query: Arc<dyn DirectoryQuery>,
    metrics: CacheMetrics,
}

impl CachingDirectoryService {
    /// Creates a service with one cache of the configured kind per record type.
    pub fn new(config: DirectoryConfig, query: Arc<dyn DirectoryQuery>) -> Self {
        let caches = RecordCaches::new(config.cache_kind(), config.record_types());
        Self::with_caches(config.ttl(), caches, query)
    }

    /// Creates a service over caches built elsewhere.
    ///
    /// The record type order of `caches` is the lookup order.
    pub fn with_caches(ttl: Duration, caches: RecordCaches, query: Arc<dyn DirectoryQuery>) -> Self {
        Self {
            ttl,
            known_types: caches.record_types().cloned().collect(),
            caches,
            negative: NegativeCache::new(),
            query,
            metrics: CacheMetrics::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Known record types, in lookup order.
    pub fn record_types(&self) -> &[RecordType] {
        &self.known_types
    }

    /// Index kinds every record cache maintains.
    pub fn index_types(&self) -> &'static [IndexKind] {
        &IndexKind::ALL
    }

    pub fn caches(&self) -> &RecordCaches {
        &self.caches
    }

    pub fn record_cache_for_type(&self, record_type: &RecordType) -> Result<&Arc<dyn RecordCache>> {
        self.caches.cache_for(record_type)
    }

    /// Every cached record of a type, stale ones included.
    pub fn list_records(&self, record_type: &RecordType) -> Result<Vec<Arc<Record>>> {
        Ok(self.caches.cache_for(record_type)?.records())
    }

    pub fn negative_cache(&self) -> &NegativeCache {
        &self.negative
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Looks up a record of one type by short name.
    pub async fn record_with_short_name(
        &self,
        record_type: &RecordType,
        short_name: &str,
    ) -> Result<Option<Arc<Record>>> {
        self.resolve(
            Some(std::slice::from_ref(record_type)),
            IndexKind::ShortName,
            short_name,
            true,
        )
        .await
    }

    /// Looks up a record of any known type by email address.
    pub async fn record_with_email_address(&self, email: &str) -> Result<Option<Arc<Record>>> {
        self.resolve(None, IndexKind::Email, email, true).await
    }

    /// Looks up a record of any known type by guid.
    pub async fn record_with_guid(&self, guid: &str) -> Result<Option<Arc<Record>>> {
        self.resolve(None, IndexKind::Guid, guid, true).await
    }

    /// Looks up a record by uid, which is indexed as the guid.
    pub async fn record_with_uid(&self, uid: &str) -> Result<Option<Arc<Record>>> {
        self.record_with_guid(uid).await
    }

    /// Resolves `key` in `index`, probing `record_types` (all known types
    /// when `None`) in order.
    ///
    /// With `cache_on_miss` false only the caches are consulted. Otherwise a
    /// miss that is not in the negative cache triggers one backend query and
    /// a second probe; a key still missing after that is added to the
    /// negative cache.
    ///
    /// Returns `Ok(None)` when nothing fresh is found.
    ///
    /// # Errors
    ///
    /// - `DirectoryError::UnknownRecordType` if a requested type is not configured
    /// - any error raised by the backend query, unchanged
    pub async fn resolve(
        &self,
        record_types: Option<&[RecordType]>,
        index: IndexKind,
        key: &str,
        cache_on_miss: bool,
    ) -> Result<Option<Arc<Record>>> {
        let start = std::time::Instant::now();
        let result = self
            .resolve_inner(record_types, index, key, cache_on_miss)
            .await;
        self.metrics
            .record_resolve_duration(index.as_str(), start.elapsed());
        result
    }

    async fn resolve_inner(
        &self,
        record_types: Option<&[RecordType]>,
        index: IndexKind,
        key: &str,
        cache_on_miss: bool,
    ) -> Result<Option<Arc<Record>>> {
        let record_types = record_types.unwrap_or(&self.known_types);
        let candidates = record_types
            .iter()
            .map(|record_type| self.caches.cache_for(record_type))
            .collect::<Result<Vec<_>>>()?;

        if let Some(record) = self.lookup(&candidates, index, key) {
            return Ok(Some(record));
        }

        if !cache_on_miss {
            return Ok(None);
        }

        if self.negative.is_suppressed(index, key, self.ttl, Instant::now()) {
            self.metrics.record_negative_hit(index.as_str());
            return Ok(None);
        }

        debug!(
            index = %index,
            key = %key,
            backend = self.query.name(),
            "Faulting record"
        );
        self.metrics.record_backend_query(self.query.name());
        self.query
            .query_directory(&self.caches, record_types, index, key)
            .await?;

        if let Some(record) = self.lookup(&candidates, index, key) {
            debug!(index = %index, key = %key, "Found record");
            return Ok(Some(record));
        }

        debug!(index = %index, key = %key, "Failed to fault record");
        self.negative.record_miss(index, key, Instant::now());
        Ok(None)
    }

    /// One probe over the candidate caches, recording metrics.
    fn lookup(
        &self,
        candidates: &[&Arc<dyn RecordCache>],
        index: IndexKind,
        key: &str,
    ) -> Option<Arc<Record>> {
        match self.probe(candidates, index, key) {
            Lookup::Fresh(record) => {
                self.metrics.record_hit(index.as_str());
                Some(record)
            },
            Lookup::Stale => {
                self.metrics.record_stale(index.as_str());
                self.metrics.record_miss(index.as_str());
                None
            },
            Lookup::Miss => {
                self.metrics.record_miss(index.as_str());
                None
            },
        }
    }

    /// The first match decides: fresh returns it, stale ends the probe.
    fn probe(&self, candidates: &[&Arc<dyn RecordCache>], index: IndexKind, key: &str) -> Lookup {
        let now = Instant::now();

        for cache in candidates {
            if let Some(record) = cache.find_record(index, key) {
                return if record.is_fresh(self.ttl, now) {
                    Lookup::Fresh(record)
                } else {
                    Lookup::Stale
                };
            }
        }

        Lookup::Miss
    }
}

impl std::fmt::Debug for CachingDirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingDirectoryService")
            .field("ttl", &self.ttl)
            .field("record_types", &self.known_types)
            .field("backend", &self.query.name())
            .finish()
    }
}
