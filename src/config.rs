//! Configuration loading and management
//!
//! Handles parsing of `taskstore.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::query::{SortKey, SortOrder, TaskSort};
use crate::storage::DEFAULT_DOCUMENT_PATH;
use crate::store::StoreOptions;

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "taskstore.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing document configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Defaults for `list`
    #[serde(default)]
    pub list: ListConfig,
}

/// Backing document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON document
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Milliseconds a mutation waits for the writer lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_DOCUMENT_PATH)
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Default ordering for `list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Sort key: dueDate, createdAt, title
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Sort direction: asc, desc
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_sort() -> String {
    SortKey::default().as_str().to_string()
}

fn default_order() -> String {
    SortOrder::default().as_str().to_string()
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
            order: default_order(),
        }
    }
}

impl ListConfig {
    /// Parsed default sort
    pub fn task_sort(&self) -> Result<TaskSort> {
        let key = self
            .sort
            .parse::<SortKey>()
            .map_err(|err| Error::InvalidConfig(format!("list.sort: {}", reason(err))))?;
        let order = self
            .order
            .parse::<SortOrder>()
            .map_err(|err| Error::InvalidConfig(format!("list.order: {}", reason(err))))?;
        Ok(TaskSort::new(key, order))
    }
}

fn reason(err: Error) -> String {
    match err {
        Error::InvalidArgument(message) => message,
        other => other.to_string(),
    }
}

impl Config {
    /// Load configuration from a `taskstore.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `taskstore.toml` from `dir`, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "ignoring invalid config"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            lock_timeout_ms: self.store.lock_timeout_ms,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "store.path cannot be empty".to_string(),
            ));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        self.list.task_sort()?;
        Ok(())
    }
}
