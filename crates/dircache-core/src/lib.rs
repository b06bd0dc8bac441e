//! Dircache Core - Domain types and traits
//!
//! This crate provides the foundational types for the dircache directory
//! cache: record types, index kinds, identity records, the error hierarchy
//! and the deployment settings overlay.

pub mod error;
pub mod record;
pub mod settings;
pub mod types;

pub use error::{DirectoryError, Result};
pub use record::{IndexValue, Record, RecordBuilder, RecordSpec};
pub use settings::{CacheKind, Settings};
pub use types::{IndexKind, RecordType};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
