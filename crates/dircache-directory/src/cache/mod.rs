//! Record caches for the caching directory service.
//!
//! Each record type gets its own [`RecordCache`], indexed by guid, short
//! name and email address. Keys confirmed absent by the backend are kept in
//! a [`NegativeCache`]. Neither cache evicts: staleness is checked lazily
//! against the TTL when an entry is read.

pub mod dict_cache;
pub mod negative;
pub mod registry;
pub mod traits;

// Re-exports
pub use dict_cache::DictRecordCache;
pub use negative::NegativeCache;
pub use registry::RecordCaches;
pub use traits::RecordCache;
