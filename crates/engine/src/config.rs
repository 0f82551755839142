//! Store configuration via `smartstore.toml`
//!
//! On first open of a data directory, a default `smartstore.toml` is
//! written next to the database file. To change settings, edit the file and
//! reopen the store.

use serde::{Deserialize, Serialize};
use smartstore_core::{Error, Result};
use smartstore_storage::{JournalMode, SqliteOptions};
use std::path::Path;
use std::time::Duration;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "smartstore.toml";

/// Database file name placed in the data directory.
pub const DATABASE_FILE_NAME: &str = "smartstore.db";

/// Store configuration loaded from `smartstore.toml`.
///
/// # Example
///
/// ```toml
/// cache_catalog = true
/// journal_mode = "wal"
/// busy_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Keep soup schemas in memory instead of reading the catalog each call.
    #[serde(default = "default_cache_catalog")]
    pub cache_catalog: bool,
    /// SQLite journal mode: `"wal"`, `"delete"` or `"memory"`.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// How long a statement waits on a locked database file.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_cache_catalog() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_catalog: default_cache_catalog(),
            journal_mode: JournalMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Connection options for the SQLite backing store.
    pub fn sqlite_options(&self) -> SqliteOptions {
        SqliteOptions {
            journal_mode: self.journal_mode,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# SmartStore configuration
#
# Cache soup schemas (table and index columns) in memory (default: true).
# When false, every operation reads the index catalog.
cache_catalog = true

# SQLite journal mode: "wal" (default), "delete" or "memory"
journal_mode = "wal"

# Milliseconds a statement waits on a locked database file (default: 5000)
busy_timeout_ms = 5000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
