//! Configuration
//!
//! Stored as JSON (`workaasana.json`); every field has a default so a
//! missing file or a partial file both work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::gateway::DEFAULT_API_BASE;

pub const CONFIG_FILE_NAME: &str = "workaasana.json";
pub const ENV_API_BASE: &str = "WORKAASANA_API_BASE";
pub const ENV_CACHE_PATH: &str = "WORKAASANA_CACHE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Root URL of the REST API
    pub api_base: String,
    /// SQLite file holding cached snapshots
    pub cache_path: PathBuf,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    /// Per-request timeout; unset means wait indefinitely
    pub request_timeout_secs: Option<u64>,
    /// One of error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from(".workaasana");
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cache_path: data_dir.join("cache.db"),
            log_dir: data_dir.join("logs"),
            request_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` and apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::from_file(path)?.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Read `path` alone, falling back to defaults when it does not exist
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply environment overrides; `lookup` is `std::env::var` outside tests
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.api_base = base;
        }
        if let Some(cache) = lookup(ENV_CACHE_PATH).filter(|v| !v.is_empty()) {
            self.cache_path = PathBuf::from(cache);
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
