//! Per-record-type cache registry.

use std::sync::Arc;

use dircache_core::{CacheKind, DirectoryError, Record, RecordType, Result};
use indexmap::IndexMap;

use super::{DictRecordCache, RecordCache};

/// The record caches of a directory, one per known record type.
///
/// Iteration follows the configured record type order, which is also the
/// order lookups probe caches in. Cloning is cheap and clones share the
/// same caches, which is how backend queries get write access to them.
#[derive(Clone)]
pub struct RecordCaches {
    caches: Arc<IndexMap<RecordType, Arc<dyn RecordCache>>>,
}

impl RecordCaches {
    /// Creates caches of the given kind for each record type.
    pub fn new(kind: CacheKind, record_types: &[RecordType]) -> Self {
        Self::with_factory(record_types, |record_type| match kind {
            CacheKind::Dict => Arc::new(DictRecordCache::new(record_type.clone())),
        })
    }

    /// Creates caches using a custom factory.
    ///
    /// Duplicate record types keep their first position.
    pub fn with_factory<F>(record_types: &[RecordType], factory: F) -> Self
    where
        F: Fn(&RecordType) -> Arc<dyn RecordCache>,
    {
        let mut caches = IndexMap::with_capacity(record_types.len());
        for record_type in record_types {
            if !caches.contains_key(record_type) {
                caches.insert(record_type.clone(), factory(record_type));
            }
        }

        Self {
            caches: Arc::new(caches),
        }
    }

    /// Returns the cache for a record type.
    pub fn cache_for(&self, record_type: &RecordType) -> Result<&Arc<dyn RecordCache>> {
        self.caches
            .get(record_type)
            .ok_or_else(|| DirectoryError::unknown_record_type(record_type))
    }

    /// Adds a record to the cache of its own record type.
    pub fn add_record(&self, record: Arc<Record>) -> Result<()> {
        self.cache_for(record.record_type())?.add_record(record)
    }

    /// Known record types, in lookup order.
    pub fn record_types(&self) -> impl Iterator<Item = &RecordType> {
        self.caches.keys()
    }

    /// Iterates over caches in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordType, &Arc<dyn RecordCache>)> {
        self.caches.iter()
    }

    /// Number of record types.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

impl std::fmt::Debug for RecordCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.caches.iter().map(|(t, c)| (t.as_str(), c.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dircache_core::IndexKind;

    #[test]
    fn test_keeps_configured_order() {
        let caches = RecordCaches::new(
            CacheKind::Dict,
            &[RecordType::resources(), RecordType::users(), RecordType::resources()],
        );

        let order: Vec<&str> = caches.record_types().map(|t| t.as_str()).collect();
        assert_eq!(order, vec!["resources", "users"]);
        assert_eq!(caches.len(), 2);
    }

    #[test]
    fn test_unknown_record_type() {
        let caches = RecordCaches::new(CacheKind::Dict, &RecordType::defaults());

        let err = caches.cache_for(&RecordType::new("printers")).err().unwrap();
        assert!(matches!(err, DirectoryError::UnknownRecordType(ref t) if t == "printers"));
    }

    #[test]
    fn test_add_record_routes_by_type() {
        let caches = RecordCaches::new(CacheKind::Dict, &RecordType::defaults());
        let group = Arc::new(Record::builder("groups").guid("grp").build());

        caches.add_record(Arc::clone(&group)).unwrap();

        let groups = caches.cache_for(&RecordType::groups()).unwrap();
        assert_eq!(groups.find_record(IndexKind::Guid, "grp"), Some(group));
        assert!(caches.cache_for(&RecordType::users()).unwrap().is_empty());
    }

    #[test]
    fn test_custom_factory() {
        let caches = RecordCaches::with_factory(&[RecordType::users()], |record_type| {
            Arc::new(DictRecordCache::new(record_type.clone()))
        });

        assert_eq!(
            caches.cache_for(&RecordType::users()).unwrap().record_type(),
            &RecordType::users()
        );
    }

    #[test]
    fn test_clones_share_caches() {
        let caches = RecordCaches::new(CacheKind::Dict, &[RecordType::users()]);
        let clone = caches.clone();

        clone
            .add_record(Arc::new(Record::builder("users").guid("g1").build()))
            .unwrap();

        assert_eq!(caches.cache_for(&RecordType::users()).unwrap().len(), 1);
    }
}
