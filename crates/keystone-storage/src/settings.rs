//! Settings of the configuration manager itself

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    error::{StorageError, StorageResult},
    types::ConfigFormat,
};

/// Prefix of environment variables that override settings
pub const ENV_PREFIX: &str = "KEYSTONE";

/// Tunables for [`crate::ConfigManager`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Directory holding `<name>.<ext>` documents and their backups
    pub data_dir: PathBuf,
    /// Syntax of every managed document
    pub format: ConfigFormat,
    /// Idle time after which maintenance drops a cached document
    pub cache_expiry_secs: u64,
    /// Period of the maintenance task
    pub maintenance_interval_secs: u64,
    /// How long shutdown waits for each pending asynchronous save
    pub shutdown_timeout_secs: u64,
    /// Asynchronous saves allowed to run at once
    pub save_workers: usize,
    /// Consecutive reload failures before the manager stops retrying an unchanged file
    pub max_errors: u32,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            format: ConfigFormat::Yaml,
            cache_expiry_secs: 30 * 60,
            maintenance_interval_secs: 60,
            shutdown_timeout_secs: 5,
            save_workers: 2,
            max_errors: 3,
        }
    }
}

impl ManagerSettings {
    /// Defaults with a specific data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load settings from an optional file, then `KEYSTONE_*` environment variables
    ///
    /// Missing keys keep their defaults. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> StorageResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config = builder
            .build()
            .map_err(|e| StorageError::config_with_source("Failed to read manager settings", e))?;
        config
            .try_deserialize()
            .map_err(|e| StorageError::config_with_source("Invalid manager settings", e))
    }

    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs.max(1))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Backing file of a named document
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", name, self.format.extension()))
    }

    fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keystone")
    }
}
