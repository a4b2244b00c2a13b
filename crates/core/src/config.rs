//! Client configuration via `sdbp.toml`
//!
//! Everything a connection needs at setup time: the controller endpoints and
//! the session defaults applied before the first command.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{ClusterConfig, DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_MASTER_TIMEOUT_MS};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "sdbp.toml";

/// Client configuration loaded from `sdbp.toml`.
///
/// # Example
///
/// ```toml
/// nodes = ["10.0.0.1:7080", "10.0.0.2:7080"]
/// global_timeout_ms = 120000
/// master_timeout_ms = 21000
/// batch_limit = 0
/// bulk_loading = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Controller endpoints, tried in order.
    pub nodes: Vec<String>,
    /// Global request timeout in milliseconds.
    #[serde(default = "default_global_timeout_ms")]
    pub global_timeout_ms: u64,
    /// Master-election timeout in milliseconds.
    #[serde(default = "default_master_timeout_ms")]
    pub master_timeout_ms: u64,
    /// Maximum commands per batch, 0 for no limit.
    #[serde(default)]
    pub batch_limit: u64,
    /// Start connections in bulk-loading mode.
    #[serde(default)]
    pub bulk_loading: bool,
}

fn default_global_timeout_ms() -> u64 {
    DEFAULT_GLOBAL_TIMEOUT_MS
}

fn default_master_timeout_ms() -> u64 {
    DEFAULT_MASTER_TIMEOUT_MS
}

impl ClientConfig {
    /// Config with the given nodes and default session settings.
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            global_timeout_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
            master_timeout_ms: DEFAULT_MASTER_TIMEOUT_MS,
            batch_limit: 0,
            bulk_loading: false,
        }
    }

    /// The endpoints as a [`ClusterConfig`].
    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig::new(self.nodes.iter().cloned())
    }

    /// Check the values a connection cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Config {
                reason: "at least one node endpoint is required".to_string(),
            });
        }
        if let Some(bad) = self.nodes.iter().find(|n| n.trim().is_empty()) {
            return Err(Error::Config {
                reason: format!("invalid node endpoint '{}'", bad),
            });
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sdbp client configuration
#
# Controller endpoints, tried in order.
nodes = ["127.0.0.1:7080"]

# Global request timeout in milliseconds (default: 120000)
global_timeout_ms = 120000

# Master-election timeout in milliseconds (default: 21000)
master_timeout_ms = 21000

# Maximum number of commands per batch, 0 = unlimited (default: 0)
batch_limit = 0

# Relax per-write consistency for large imports (default: false)
bulk_loading = false
"#
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
