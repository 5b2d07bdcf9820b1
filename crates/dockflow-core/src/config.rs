//! Configuration system for dockflow.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $DOCKFLOW_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/dockflow/config.toml
//!   3. ~/.config/dockflow/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockflowConfig {
    pub backend: BackendConfig,
    pub reconcile: ReconcileConfig,
    pub storage: StorageConfig,
    pub docking: DockingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the task API, e.g. "http://127.0.0.1:8020/api/v2".
    pub base_url: String,
    /// Prediction database the tasks run against.
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Delay between reconciliation cycles. The timer is armed only
    /// after a cycle fully settles, so this is a floor, not a rate.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the per-prediction task ledgers.
    pub ledger_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    /// Accepted Vina exhaustiveness range, inclusive.
    pub min_exhaustiveness: u32,
    pub max_exhaustiveness: u32,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for DockflowConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            reconcile: ReconcileConfig::default(),
            storage: StorageConfig::default(),
            docking: DockingConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8020/api/v2".to_string(),
            database: "v3".to_string(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 7,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_dir: data_dir().join("ledger"),
        }
    }
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            min_exhaustiveness: 1,
            max_exhaustiveness: 64,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("dockflow")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("dockflow")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl DockflowConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            DockflowConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("DOCKFLOW_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&DockflowConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply DOCKFLOW_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCKFLOW_BACKEND__BASE_URL") {
            self.backend.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCKFLOW_BACKEND__DATABASE") {
            self.backend.database = v;
        }
        if let Ok(v) = std::env::var("DOCKFLOW_RECONCILE__POLL_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.reconcile.poll_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("DOCKFLOW_STORAGE__LEDGER_DIR") {
            self.storage.ledger_dir = PathBuf::from(v);
        }
    }
}
