//! Error types for the directory cache.
//!
//! Two families of failure exist. Invariant violations (a remove that does
//! not match what an earlier add inserted, or an attribute of an unsupported
//! shape) are programming defects and abort the mutating call. Backend
//! errors come from the directory query implementation and are handed back
//! to the caller of a lookup untouched.
//!
//! A lookup that finds nothing is not an error: lookups return
//! `Ok(None)`.
//!
//! # Example
//!
//! ```
//! use dircache_core::{DirectoryError, IndexKind, RecordType};
//!
//! let error = DirectoryError::missing_index_entry(RecordType::users(), IndexKind::Email, "a@b.c");
//! assert!(error.is_invariant_violation());
//! ```

use std::io;
use thiserror::Error;

use crate::types::{IndexKind, RecordType};

/// Main error type for directory cache operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A remove expected an index entry that is not present.
    #[error("Missing record index item: {record_type} {index} '{key}'")]
    MissingIndexEntry {
        /// Cache the entry was expected in
        record_type: RecordType,
        /// Index that was missing the entry
        index: IndexKind,
        /// Index value that was expected
        key: String,
    },

    /// A remove referenced a record that is not a member of the cache.
    #[error("Record {} is not cached for type '{record_type}'", guid.as_deref().unwrap_or("<no guid>"))]
    RecordNotCached {
        /// Cache that was searched
        record_type: RecordType,
        /// Guid of the record, if it has one
        guid: Option<String>,
    },

    /// A record attribute had a shape other than absent, string, or a list of strings.
    #[error("Data from record attribute '{attribute}' must be a string or list of strings, found {found}")]
    UnsupportedShape {
        /// Attribute name
        attribute: String,
        /// Description of the offending shape
        found: &'static str,
    },

    /// The record type is not configured for this deployment.
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    /// The directory backend failed while resolving a key.
    #[error("Directory backend '{source_name}' failed: {message}")]
    Backend {
        /// Name of the backend that failed
        source_name: String,
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Settings could not be loaded.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DirectoryError {
    /// Creates a MissingIndexEntry error.
    pub fn missing_index_entry(
        record_type: RecordType,
        index: IndexKind,
        key: impl Into<String>,
    ) -> Self {
        Self::MissingIndexEntry {
            record_type,
            index,
            key: key.into(),
        }
    }

    /// Creates a RecordNotCached error.
    pub fn record_not_cached(record_type: RecordType, guid: Option<&str>) -> Self {
        Self::RecordNotCached {
            record_type,
            guid: guid.map(str::to_string),
        }
    }

    /// Creates an UnsupportedShape error.
    pub fn unsupported_shape(attribute: impl Into<String>, found: &'static str) -> Self {
        Self::UnsupportedShape {
            attribute: attribute.into(),
            found,
        }
    }

    /// Creates an UnknownRecordType error.
    pub fn unknown_record_type(record_type: &RecordType) -> Self {
        Self::UnknownRecordType(record_type.as_str().to_string())
    }

    /// Creates a Backend error without a cause.
    pub fn backend(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            source_name: source_name.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Backend error with a cause.
    pub fn backend_with_cause<E>(
        source_name: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source_name: source_name.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error signals a broken cache invariant.
    ///
    /// These indicate a defect in the caller, not a runtime condition.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingIndexEntry { .. } | Self::RecordNotCached { .. } | Self::UnsupportedShape { .. }
        )
    }

    /// Returns true if this error came from the directory backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

/// Type alias for Results with DirectoryError.
pub type Result<T> = std::result::Result<T, DirectoryError>;
