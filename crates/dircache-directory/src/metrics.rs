//! Directory cache metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the directory cache metrics.
/// Call once at startup, after a recorder is installed.
pub fn register_cache_metrics() {
    metrics::describe_counter!(
        "dircache_lookup_hits_total",
        "Lookups answered by a fresh cached record"
    );
    metrics::describe_counter!(
        "dircache_lookup_misses_total",
        "Lookups that found no fresh cached record"
    );
    metrics::describe_counter!(
        "dircache_lookup_stale_total",
        "Lookups that matched a stale cached record"
    );
    metrics::describe_counter!(
        "dircache_negative_hits_total",
        "Backend queries suppressed by the negative cache"
    );
    metrics::describe_counter!(
        "dircache_backend_queries_total",
        "Queries sent to the directory backend"
    );
    metrics::describe_histogram!(
        "dircache_resolve_seconds",
        "Time spent resolving a key, backend query included"
    );
}

/// Recorder for directory cache metrics.
///
/// Counters are mirrored in local atomics so tests and logs can read them
/// without a metrics recorder installed.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    stale: Arc<AtomicU64>,
    negative_hits: Arc<AtomicU64>,
    backend_queries: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, index: &'static str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("dircache_lookup_hits_total", "index" => index).increment(1);
    }

    pub fn record_miss(&self, index: &'static str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("dircache_lookup_misses_total", "index" => index).increment(1);
    }

    /// A stale match; also counted as a miss by the caller.
    pub fn record_stale(&self, index: &'static str) {
        self.stale.fetch_add(1, Ordering::Relaxed);
        counter!("dircache_lookup_stale_total", "index" => index).increment(1);
    }

    pub fn record_negative_hit(&self, index: &'static str) {
        self.negative_hits.fetch_add(1, Ordering::Relaxed);
        counter!("dircache_negative_hits_total", "index" => index).increment(1);
    }

    pub fn record_backend_query(&self, backend: &str) {
        self.backend_queries.fetch_add(1, Ordering::Relaxed);
        counter!("dircache_backend_queries_total", "backend" => backend.to_string()).increment(1);
    }

    pub fn record_resolve_duration(&self, index: &'static str, duration: Duration) {
        histogram!("dircache_resolve_seconds", "index" => index).record(duration.as_secs_f64());
    }

    /// Share of lookups answered from cache.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    pub fn negative_hits(&self) -> u64 {
        self.negative_hits.load(Ordering::Relaxed)
    }

    pub fn backend_queries(&self) -> u64 {
        self.backend_queries.load(Ordering::Relaxed)
    }
}
