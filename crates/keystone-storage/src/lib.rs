//! # Keystone Storage
//!
//! Lifecycle management for named configuration documents: loading, caching,
//! reload on external change, backups, validation on reload, periodic
//! maintenance and graceful shutdown.
//!
//! Documents live in one data directory as `<name>.<ext>`. Before a document is
//! reloaded its file is copied to `<name>.bak` and `<name>.gz`.
//!
//! ```ignore
//! let manager = ConfigManager::new(ManagerSettings::with_data_dir("data"));
//! manager.start()?;
//!
//! let worlds = manager.create_config("worlds", &defaults)?;
//! worlds.write().set("spawn.radius", 32);
//! manager.save_config_async("worlds")?;
//!
//! manager.shutdown().await;
//! ```

pub mod backup;
pub mod clock;
pub mod document;
pub mod error;
pub mod logging;
pub mod manager;
pub mod settings;
pub mod store;
pub mod types;

pub use backup::{BackupFiles, BackupWriter, BACKUP_EXTENSION, COMPRESSED_EXTENSION};
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::ConfigDocument;
pub use error::{IoOperation, StorageError, StorageResult};
pub use logging::{ConfigLogger, LogLevel, MemoryLogger, TracingLogger};
pub use manager::{
    ConfigManager, ConfigManagerBuilder, MaintenanceReport, SharedDocument, DEFAULT_CONFIG_NAME,
};
pub use settings::ManagerSettings;
pub use store::{ConfigStore, FileStore};
pub use types::ConfigFormat;
