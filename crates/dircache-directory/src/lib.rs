//! # Dircache Directory
//!
//! Caching directory service for identity lookups.
//!
//! This crate sits in front of a slow directory backend (users, groups,
//! locations, resources) and answers "find the record with this guid /
//! short name / email" from per-record-type caches.
//!
//! ## Features
//!
//! - One multi-index [`RecordCache`] per record type, with a map based default
//! - TTL based staleness computed lazily at read time
//! - Negative caching of keys the backend could not resolve
//! - Async trait-based backend abstraction ([`DirectoryQuery`])
//! - A static record-file backend for fixtures and small deployments
//!
//! ## Example
//!
//! ```ignore
//! use dircache_directory::{CachingDirectoryService, DirectoryConfig, StaticDirectory};
//!
//! let backend = StaticDirectory::from_path("records.yaml")?;
//! let service = CachingDirectoryService::new(DirectoryConfig::default(), Arc::new(backend));
//!
//! let alice = service.record_with_short_name(&RecordType::users(), "alice").await?;
//! ```

pub mod cache;
pub mod config;
pub mod metrics;
pub mod service;
pub mod source;

// Re-exports
pub use cache::{DictRecordCache, NegativeCache, RecordCache, RecordCaches};
pub use config::DirectoryConfig;
pub use crate::metrics::{CacheMetrics, register_cache_metrics};
pub use service::CachingDirectoryService;
pub use source::{DirectoryQuery, StaticDirectory};

// Re-export dircache_core for consumers
pub use dircache_core;
