//! Map based record cache.

use std::collections::HashMap;
use std::sync::Arc;

use dircache_core::{DirectoryError, IndexKind, Record, RecordType, Result};
use parking_lot::RwLock;
use tracing::{trace, warn};

use super::RecordCache;

/// Full set plus one map per index kind.
///
/// The full set is keyed by allocation, so two records with identical
/// content are still two members.
#[derive(Debug)]
struct DictState {
    records: HashMap<usize, Arc<Record>>,
    indexed_by: HashMap<IndexKind, HashMap<String, Arc<Record>>>,
}

impl DictState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            indexed_by: IndexKind::ALL
                .iter()
                .map(|kind| (*kind, HashMap::new()))
                .collect(),
        }
    }

    fn index(&self, kind: IndexKind) -> Option<&HashMap<String, Arc<Record>>> {
        self.indexed_by.get(&kind)
    }

    fn insert(&mut self, record: Arc<Record>) {
        for kind in IndexKind::ALL {
            let index = self.indexed_by.entry(kind).or_default();
            for key in record.index_value(kind).values() {
                index.insert(key.to_string(), Arc::clone(&record));
            }
        }
        self.records.insert(address(&record), record);
    }

    /// Checks every expected entry before touching anything.
    fn verify_removable(&self, record_type: &RecordType, record: &Record) -> Result<()> {
        if !self.records.contains_key(&address(record)) {
            return Err(DirectoryError::record_not_cached(
                record_type.clone(),
                record.guid(),
            ));
        }

        for kind in IndexKind::ALL {
            for key in record.index_value(kind).values() {
                let present = self
                    .index(kind)
                    .is_some_and(|index| index.contains_key(key));
                if !present {
                    return Err(DirectoryError::missing_index_entry(
                        record_type.clone(),
                        kind,
                        key,
                    ));
                }
            }
        }

        Ok(())
    }

    fn remove(&mut self, record: &Record) {
        self.records.remove(&address(record));

        for kind in IndexKind::ALL {
            let Some(index) = self.indexed_by.get_mut(&kind) else {
                continue;
            };
            for key in record.index_value(kind).values() {
                // Entries claimed by a later record belong to that record now
                if index.get(key).is_some_and(|owner| std::ptr::eq(owner.as_ref(), record)) {
                    index.remove(key);
                }
            }
        }
    }
}

fn address(record: &Record) -> usize {
    std::ptr::from_ref(record) as usize
}

/// Record cache backed by process-local hash maps.
///
/// The full set and the three index maps live behind a single read/write
/// lock, so a mutation touching several indexes is atomic with respect to
/// lookups and other mutations on the same record type. The cache is not
/// shared with other processes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dircache_core::{IndexKind, Record, RecordType};
/// use dircache_directory::cache::{DictRecordCache, RecordCache};
///
/// let cache = DictRecordCache::new(RecordType::users());
/// let record = Arc::new(Record::builder("users").guid("g1").short_name("alice").build());
///
/// cache.add_record(Arc::clone(&record)).unwrap();
/// assert_eq!(cache.find_record(IndexKind::ShortName, "alice"), Some(record));
/// ```
#[derive(Debug)]
pub struct DictRecordCache {
    record_type: RecordType,
    state: RwLock<DictState>,
}

impl DictRecordCache {
    /// Creates an empty cache for the given record type.
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            state: RwLock::new(DictState::new()),
        }
    }

    /// Number of entries in one index.
    pub fn index_len(&self, index: IndexKind) -> usize {
        self.state.read().index(index).map_or(0, HashMap::len)
    }
}

impl RecordCache for DictRecordCache {
    fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    fn add_record(&self, record: Arc<Record>) -> Result<()> {
        trace!(record_type = %self.record_type, guid = ?record.guid(), "Adding record");
        self.state.write().insert(record);
        Ok(())
    }

    fn remove_record(&self, record: &Record) -> Result<()> {
        let mut state = self.state.write();

        if let Err(e) = state.verify_removable(&self.record_type, record) {
            warn!(record_type = %self.record_type, error = %e, "Record cache invariant violated");
            return Err(e);
        }

        trace!(record_type = %self.record_type, guid = ?record.guid(), "Removing record");
        state.remove(record);
        Ok(())
    }

    fn replace_record(&self, old: &Record, new: Arc<Record>) -> Result<()> {
        let mut state = self.state.write();

        if let Err(e) = state.verify_removable(&self.record_type, old) {
            warn!(record_type = %self.record_type, error = %e, "Record cache invariant violated");
            return Err(e);
        }

        trace!(record_type = %self.record_type, guid = ?new.guid(), "Replacing record");
        state.remove(old);
        state.insert(new);
        Ok(())
    }

    fn find_record(&self, index: IndexKind, key: &str) -> Option<Arc<Record>> {
        self.state
            .read()
            .index(index)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    fn records(&self) -> Vec<Arc<Record>> {
        self.state.read().records.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.state.read().records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Arc<Record> {
        Arc::new(
            Record::builder("users")
                .guid("g1")
                .short_names(["alice", "al"])
                .email_address("alice@example.com")
                .build(),
        )
    }

    fn index_snapshot(cache: &DictRecordCache) -> Vec<(IndexKind, Vec<(String, Option<String>)>)> {
        let state = cache.state.read();
        IndexKind::ALL
            .iter()
            .map(|kind| {
                let mut entries: Vec<_> = state
                    .index(*kind)
                    .unwrap()
                    .iter()
                    .map(|(k, r)| (k.clone(), r.guid().map(str::to_string)))
                    .collect();
                entries.sort();
                (*kind, entries)
            })
            .collect()
    }

    #[test]
    fn test_add_indexes_every_value() {
        let cache = DictRecordCache::new(RecordType::users());
        let record = alice();

        cache.add_record(Arc::clone(&record)).unwrap();

        assert_eq!(cache.find_record(IndexKind::Guid, "g1"), Some(Arc::clone(&record)));
        assert_eq!(cache.find_record(IndexKind::ShortName, "alice"), Some(Arc::clone(&record)));
        assert_eq!(cache.find_record(IndexKind::ShortName, "al"), Some(Arc::clone(&record)));
        assert_eq!(cache.find_record(IndexKind::Email, "alice@example.com"), Some(record));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_absent_attribute_is_skipped() {
        let cache = DictRecordCache::new(RecordType::groups());
        let record = Arc::new(Record::builder("groups").guid("grp").short_name("staff").build());

        cache.add_record(record).unwrap();

        assert_eq!(cache.index_len(IndexKind::Guid), 1);
        assert_eq!(cache.index_len(IndexKind::ShortName), 1);
        assert_eq!(cache.index_len(IndexKind::Email), 0);
    }

    #[test]
    fn test_find_miss_returns_none() {
        let cache = DictRecordCache::new(RecordType::users());
        assert!(cache.find_record(IndexKind::Email, "nobody@example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_clears_entries() {
        let cache = DictRecordCache::new(RecordType::users());
        let record = alice();
        cache.add_record(Arc::clone(&record)).unwrap();

        cache.remove_record(&record).unwrap();

        assert!(cache.find_record(IndexKind::Guid, "g1").is_none());
        assert!(cache.find_record(IndexKind::ShortName, "alice").is_none());
        assert!(cache.find_record(IndexKind::ShortName, "al").is_none());
        assert!(cache.find_record(IndexKind::Email, "alice@example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_unknown_record_is_invariant_violation() {
        let cache = DictRecordCache::new(RecordType::users());
        let bob = Arc::new(Record::builder("users").guid("g2").short_name("bob").build());
        cache.add_record(Arc::clone(&bob)).unwrap();
        let before = index_snapshot(&cache);

        let err = cache.remove_record(&alice()).unwrap_err();

        assert!(err.is_invariant_violation());
        assert!(matches!(err, DirectoryError::RecordNotCached { .. }));
        // Unrelated entries untouched
        assert_eq!(index_snapshot(&cache), before);
        assert_eq!(cache.find_record(IndexKind::ShortName, "bob"), Some(bob));
    }

    #[test]
    fn test_remove_twice_fails() {
        let cache = DictRecordCache::new(RecordType::users());
        let record = alice();
        cache.add_record(Arc::clone(&record)).unwrap();
        cache.remove_record(&record).unwrap();

        assert!(cache.remove_record(&record).is_err());
    }

    #[test]
    fn test_missing_index_entry_is_detected_without_mutation() {
        let cache = DictRecordCache::new(RecordType::resources());
        let first = Arc::new(Record::builder("resources").guid("r1").short_name("ops").build());
        let second = Arc::new(Record::builder("resources").guid("r2").short_name("ops").build());

        cache.add_record(Arc::clone(&first)).unwrap();
        cache.add_record(Arc::clone(&second)).unwrap();
        // "ops" belongs to the second record and goes away with it
        cache.remove_record(&second).unwrap();
        let before = index_snapshot(&cache);

        let err = cache.remove_record(&first).unwrap_err();

        assert!(matches!(
            err,
            DirectoryError::MissingIndexEntry { index: IndexKind::ShortName, ref key, .. } if key == "ops"
        ));
        assert_eq!(index_snapshot(&cache), before);
        assert_eq!(cache.find_record(IndexKind::Guid, "r1"), Some(first));
    }

    #[test]
    fn test_last_write_wins() {
        let cache = DictRecordCache::new(RecordType::users());
        let first = Arc::new(Record::builder("users").guid("g1").short_name("ops").build());
        let second = Arc::new(Record::builder("users").guid("g2").short_name("ops").build());

        cache.add_record(Arc::clone(&first)).unwrap();
        cache.add_record(Arc::clone(&second)).unwrap();

        assert_eq!(cache.find_record(IndexKind::ShortName, "ops"), Some(Arc::clone(&second)));
        // The earlier record stays reachable through its guid
        assert_eq!(cache.find_record(IndexKind::Guid, "g1"), Some(Arc::clone(&first)));

        // Removing the superseded record leaves the newer claim alone
        cache.remove_record(&first).unwrap();
        assert_eq!(cache.find_record(IndexKind::ShortName, "ops"), Some(second));
    }

    #[test]
    fn test_replace_matches_remove_then_add() {
        let replaced = DictRecordCache::new(RecordType::users());
        let sequential = DictRecordCache::new(RecordType::users());
        let old = alice();
        let new = Arc::new(
            Record::builder("users")
                .guid("g1")
                .short_name("alice")
                .email_address("alice@new.example.com")
                .build(),
        );

        replaced.add_record(Arc::clone(&old)).unwrap();
        replaced.replace_record(&old, Arc::clone(&new)).unwrap();

        sequential.add_record(Arc::clone(&old)).unwrap();
        sequential.remove_record(&old).unwrap();
        sequential.add_record(Arc::clone(&new)).unwrap();

        assert_eq!(index_snapshot(&replaced), index_snapshot(&sequential));
        assert!(replaced.find_record(IndexKind::ShortName, "al").is_none());
        assert_eq!(replaced.find_record(IndexKind::Email, "alice@new.example.com"), Some(new));
    }

    #[test]
    fn test_replace_with_missing_old_does_not_add() {
        let cache = DictRecordCache::new(RecordType::users());
        let new = Arc::new(Record::builder("users").guid("g9").short_name("zed").build());

        assert!(cache.replace_record(&alice(), new).is_err());
        assert!(cache.find_record(IndexKind::ShortName, "zed").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_records_are_distinct_members() {
        let cache = DictRecordCache::new(RecordType::users());
        let first = alice();
        let second = alice();
        assert_eq!(first, second);

        cache.add_record(Arc::clone(&first)).unwrap();
        cache.add_record(Arc::clone(&second)).unwrap();
        assert_eq!(cache.len(), 2);

        cache.remove_record(&first).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(
            &cache.find_record(IndexKind::ShortName, "alice").unwrap(),
            &second
        ));

        cache.remove_record(&second).unwrap();
        assert!(cache.is_empty());
        assert!(cache.find_record(IndexKind::Guid, "g1").is_none());
    }

    #[test]
    fn test_equal_copy_is_not_cached() {
        let cache = DictRecordCache::new(RecordType::users());
        let record = alice();
        cache.add_record(Arc::clone(&record)).unwrap();

        let copy = Record::clone(&record);
        let err = cache.remove_record(&copy).unwrap_err();

        assert!(matches!(err, DirectoryError::RecordNotCached { .. }));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_records_snapshot() {
        let cache = DictRecordCache::new(RecordType::users());
        cache.add_record(alice()).unwrap();
        cache
            .add_record(Arc::new(Record::builder("users").guid("g2").build()))
            .unwrap();

        let mut guids: Vec<_> = cache
            .records()
            .iter()
            .filter_map(|r| r.guid().map(str::to_string))
            .collect();
        guids.sort();
        assert_eq!(guids, vec!["g1", "g2"]);
    }
}
