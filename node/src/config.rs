//! Node configuration file.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/bastion"
//!
//! [vault]
//! custody_account = "bastion-vault"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! Every field has a default, so a partial file (or none at all) is valid.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = `$HOME/.bastion`.
    #[serde(default)]
    pub data_dir: String,
}

/// Vault deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Host account that holds custodied funds.
    #[serde(default = "default_custody_account")]
    pub custody_account: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" | "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_custody_account() -> String {
    "bastion-vault".to_string()
}

fn default_log_level() -> String {
    "bastion_node=info,bastion_protocol=info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            custody_account: default_custody_account(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from `path`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Resolve and load the configuration for one invocation: an explicit
    /// `--config` path wins, otherwise `config.toml` inside the data
    /// directory. A `--data-dir` flag overrides `storage.data_dir`.
    pub fn resolve(config: Option<&Path>, data_dir: Option<&Path>) -> anyhow::Result<Self> {
        let path = match (config, data_dir) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(dir)) => dir.join("config.toml"),
            (None, None) => default_data_dir().join("config.toml"),
        };
        let mut loaded = Self::load(&path)?;
        if let Some(dir) = data_dir {
            loaded.storage.data_dir = dir.display().to_string();
        }
        Ok(loaded)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Location of the sled database inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("db")
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".bastion"))
        .unwrap_or_else(|_| PathBuf::from(".bastion"))
}
