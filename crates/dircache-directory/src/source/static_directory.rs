//! Directory backend serving a fixed list of records.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dircache_core::{DirectoryError, IndexKind, Record, RecordSpec, RecordType, Result};
use tracing::{debug, info};

use super::DirectoryQuery;
use crate::cache::RecordCaches;

/// A backend answering from records loaded up front, typically from a YAML
/// or JSON record file.
///
/// Every query builds fresh copies of the matching records, so a record
/// faulted in again after going stale gets a new cache timestamp.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    records: Vec<Record>,
}

impl StaticDirectory {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Validates record specs and builds a directory from them.
    pub fn from_specs(specs: Vec<RecordSpec>) -> Result<Self> {
        let records = specs
            .into_iter()
            .map(RecordSpec::into_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    /// Parses a YAML (or JSON) list of records.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let specs: Vec<RecordSpec> = serde_yaml::from_str(content)
            .map_err(|e| DirectoryError::config(format!("invalid record file: {}", e)))?;
        Self::from_specs(specs)
    }

    /// Loads a record file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let directory = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let specs: Vec<RecordSpec> = serde_json::from_str(&content).map_err(|e| {
                    DirectoryError::config(format!("invalid record file {}: {}", path.display(), e))
                })?;
                Self::from_specs(specs)?
            },
            _ => Self::from_yaml_str(&content)?,
        };

        info!(
            path = %path.display(),
            records = directory.len(),
            "Loaded directory records"
        );

        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DirectoryQuery for StaticDirectory {
    async fn query_directory(
        &self,
        caches: &RecordCaches,
        record_types: &[RecordType],
        index: IndexKind,
        key: &str,
    ) -> Result<()> {
        let matches = self.records.iter().filter(|record| {
            record_types.contains(record.record_type()) && record.index_value(index).contains(key)
        });

        let mut count = 0;
        for template in matches {
            let cache = caches.cache_for(template.record_type())?;
            let record = Arc::new(template.refreshed());

            let existing = template
                .guid()
                .and_then(|guid| cache.find_record(IndexKind::Guid, guid));
            match existing {
                Some(old) => cache.replace_record(&old, record)?,
                None => cache.add_record(record)?,
            }
            count += 1;
        }

        debug!(index = %index, key = %key, count, "Static directory query complete");
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}
