//! Deployment settings.
//!
//! Settings start from a documented default set. An optional settings file
//! (YAML, JSON or TOML, picked by extension) is overlaid on top, followed by
//! `DIRCACHE_*` environment variables. Only the keys present in a layer
//! replace the defaults; nothing is validated beyond deserialization.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};
use crate::types::RecordType;

/// Default location of the settings file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/dircache/dircache.yaml";

/// Prefix for environment overrides (`DIRCACHE_CACHE_TIMEOUT=10`).
pub const ENV_PREFIX: &str = "DIRCACHE";

/// Which record cache implementation backs each record type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Process-local map based cache.
    #[default]
    Dict,
}

/// Flat settings object for a directory cache deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Public network host name.
    pub server_host_name: String,
    /// HTTP port.
    pub port: u16,
    /// SSL port.
    pub ssl_port: u16,
    /// Root of the data store.
    pub document_root: PathBuf,
    /// Enables debug logging.
    pub verbose: bool,
    /// Minutes before a cached record or negative entry goes stale.
    pub cache_timeout: u64,
    /// Known record types, in lookup order.
    pub record_types: Vec<RecordType>,
    /// Record cache implementation.
    pub cache_kind: CacheKind,
    /// Record file served by the static directory backend.
    pub directory_records: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_host_name: "localhost".to_string(),
            port: 8008,
            ssl_port: 8443,
            document_root: PathBuf::from("/Library/CalendarServer/Documents"),
            verbose: false,
            cache_timeout: 30,
            record_types: RecordType::defaults(),
            cache_kind: CacheKind::Dict,
            directory_records: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (if it exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(path, Self::environment())
    }

    /// Loads settings from `path` (if it exists) and the given environment source.
    pub fn from_sources(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(environment)
            .build()
            .and_then(|config| config.try_deserialize::<Settings>())
            .map_err(|e| DirectoryError::config(e.to_string()))
    }

    /// The environment layer used by [`load`](Self::load).
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("record_types")
    }

    /// TTL shared by positive and negative cache entries.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_timeout.saturating_mul(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn empty_env() -> Environment {
        Settings::environment().source(Some(config::Map::new()))
    }

    #[test]
    fn test_huge_cache_timeout_saturates() {
        let settings = Settings {
            cache_timeout: u64::MAX / 2,
            ..Settings::default()
        };

        assert_eq!(settings.cache_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.port, 8008);
        assert_eq!(settings.ssl_port, 8443);
        assert_eq!(settings.cache_timeout, 30);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(1800));
        assert_eq!(settings.record_types, RecordType::defaults());
        assert_eq!(settings.cache_kind, CacheKind::Dict);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let settings =
            Settings::from_sources(Some(Path::new("/nonexistent/dircache.yaml")), empty_env())
                .unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_overlays_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "cache_timeout: 5\nrecord_types: [resources, users]\nverbose: true"
        )
        .unwrap();

        let settings = Settings::from_sources(Some(file.path()), empty_env()).unwrap();

        assert_eq!(settings.cache_timeout, 5);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
        assert_eq!(
            settings.record_types,
            vec![RecordType::resources(), RecordType::users()]
        );
        assert!(settings.verbose);
        // Untouched keys keep their defaults
        assert_eq!(settings.port, 8008);
        assert_eq!(settings.server_host_name, "localhost");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"cache_timeout": 5, "port": 9000}}"#).unwrap();

        let env = Settings::environment().source(Some(config::Map::from([
            ("DIRCACHE_CACHE_TIMEOUT".to_string(), "1".to_string()),
            ("DIRCACHE_RECORD_TYPES".to_string(), "groups,users".to_string()),
        ])));

        let settings = Settings::from_sources(Some(file.path()), env).unwrap();

        assert_eq!(settings.cache_timeout, 1);
        assert_eq!(settings.port, 9000);
        assert_eq!(
            settings.record_types,
            vec![RecordType::groups(), RecordType::users()]
        );
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "port: not-a-port").unwrap();

        let err = Settings::from_sources(Some(file.path()), empty_env()).unwrap_err();
        assert!(matches!(err, DirectoryError::Config { .. }));
    }
}
