//! Dircache CLI - one-shot lookups against a caching directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dircache_core::{IndexKind, Record, RecordType, Settings, settings::DEFAULT_CONFIG_FILE};
use dircache_directory::{CachingDirectoryService, DirectoryConfig, StaticDirectory};
use tracing::{info, warn};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "DIRCACHE_CONFIG";

/// Index named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexArg {
    Guid,
    #[value(name = "shortname")]
    ShortName,
    Email,
}

impl From<IndexArg> for IndexKind {
    fn from(arg: IndexArg) -> Self {
        match arg {
            IndexArg::Guid => IndexKind::Guid,
            IndexArg::ShortName => IndexKind::ShortName,
            IndexArg::Email => IndexKind::Email,
        }
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "dircache", version)]
#[command(about = "Resolve one directory record through the cache")]
pub struct Lookup {
    /// Index to search
    #[arg(value_enum)]
    pub index: IndexArg,

    /// Key to look up
    pub key: String,

    /// Restrict the lookup to one record type (required for shortname)
    #[arg(required_if_eq("index", "shortname"))]
    pub record_type: Option<RecordType>,
}

impl Lookup {
    pub fn index_kind(&self) -> IndexKind {
        self.index.into()
    }
}

/// Settings file path from the environment, or the default location.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Builds the directory service described by `settings`.
pub fn build_service(settings: &Settings) -> anyhow::Result<CachingDirectoryService> {
    let backend = match &settings.directory_records {
        Some(path) => StaticDirectory::from_path(path)
            .with_context(|| format!("loading records from {}", path.display()))?,
        None => {
            warn!("No directory_records configured, every lookup will miss");
            StaticDirectory::default()
        },
    };

    Ok(CachingDirectoryService::new(
        DirectoryConfig::from_settings(settings),
        Arc::new(backend),
    ))
}

/// Runs one lookup.
pub async fn run(
    service: &CachingDirectoryService,
    lookup: &Lookup,
) -> anyhow::Result<Option<Arc<Record>>> {
    let index = lookup.index_kind();
    info!(%index, key = %lookup.key, "Resolving");

    let record = match (index, &lookup.record_type) {
        (IndexKind::ShortName, Some(record_type)) => {
            service
                .record_with_short_name(record_type, &lookup.key)
                .await?
        },
        (index, Some(record_type)) => {
            service
                .resolve(Some(std::slice::from_ref(record_type)), index, &lookup.key, true)
                .await?
        },
        (IndexKind::Email, None) => service.record_with_email_address(&lookup.key).await?,
        (_, None) => service.record_with_guid(&lookup.key).await?,
    };

    Ok(record)
}
