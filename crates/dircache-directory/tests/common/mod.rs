#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dircache_core::{IndexKind, Record, RecordType, Result};
use dircache_directory::{
    CachingDirectoryService, DirectoryConfig, DirectoryQuery, RecordCaches, StaticDirectory,
};
use parking_lot::Mutex;

pub const TTL: Duration = Duration::from_secs(1800);

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    pub record_types: Vec<RecordType>,
    pub index: IndexKind,
    pub key: String,
}

/// Backend wrapper that records every query before delegating.
#[derive(Default)]
pub struct RecordingDirectory {
    inner: StaticDirectory,
    calls: Mutex<Vec<QueryCall>>,
    count: AtomicU32,
    delay: Option<Duration>,
}

impl RecordingDirectory {
    /// A backend that never finds anything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: StaticDirectory::new(records),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DirectoryQuery for RecordingDirectory {
    async fn query_directory(
        &self,
        caches: &RecordCaches,
        record_types: &[RecordType],
        index: IndexKind,
        key: &str,
    ) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(QueryCall {
            record_types: record_types.to_vec(),
            index,
            key: key.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.inner
            .query_directory(caches, record_types, index, key)
            .await
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn user(guid: &str, short_name: &str, email: &str) -> Record {
    Record::builder("users")
        .guid(guid)
        .short_name(short_name)
        .email_address(email)
        .build()
}

pub fn resource(guid: &str, short_name: &str) -> Record {
    Record::builder("resources")
        .guid(guid)
        .short_name(short_name)
        .build()
}

pub fn service(backend: Arc<RecordingDirectory>) -> CachingDirectoryService {
    CachingDirectoryService::new(
        DirectoryConfig::new(TTL, RecordType::defaults()),
        backend,
    )
}
