//! Record cache trait definition.

use std::sync::Arc;

use dircache_core::{IndexKind, Record, RecordType, Result};

/// Per-record-type store of directory records.
///
/// Implementations keep a full set of the records of one type plus one
/// index per [`IndexKind`], mapping every value of the backing attribute to
/// the record that exposes it. A later add of a different record with the
/// same index value supersedes the earlier mapping.
///
/// # Implementors
///
/// - `DictRecordCache` - process-local maps behind a read/write lock
///
/// All methods take `&self`; implementations synchronize internally so a
/// cache can be shared between concurrent lookups.
pub trait RecordCache: Send + Sync {
    /// The record type this cache holds.
    fn record_type(&self) -> &RecordType;

    /// Inserts a record into the full set and every index it has values for.
    ///
    /// Indexes whose attribute is absent on the record are skipped.
    fn add_record(&self, record: Arc<Record>) -> Result<()>;

    /// Removes a record and exactly the index entries its add inserted.
    ///
    /// # Errors
    ///
    /// - `DirectoryError::RecordNotCached` if the record is not in the full set
    /// - `DirectoryError::MissingIndexEntry` if an expected index entry is gone
    ///
    /// Both are invariant violations; nothing is mutated when they occur.
    /// `record` must be the allocation that was added; an equal copy is not
    /// the cached record.
    fn remove_record(&self, record: &Record) -> Result<()>;

    /// Removes `old` then adds `new`.
    ///
    /// If removing `old` fails, `new` is not added.
    fn replace_record(&self, old: &Record, new: Arc<Record>) -> Result<()> {
        self.remove_record(old)?;
        self.add_record(new)
    }

    /// Returns the record currently mapped under `key` in the given index.
    ///
    /// No staleness check is performed.
    fn find_record(&self, index: IndexKind, key: &str) -> Option<Arc<Record>>;

    /// Returns a snapshot of every record in the cache.
    fn records(&self) -> Vec<Arc<Record>>;

    /// Returns the number of records in the full set.
    fn len(&self) -> usize;

    /// Returns true if the cache holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
