//! Filesystem access used by the configuration manager

use std::{
    path::Path,
    time::SystemTime,
};

use crate::error::{IoOperation, StorageError, StorageResult};

/// Persistence backend for configuration files and their backups
///
/// Every file the manager touches goes through this trait, so tests can slow
/// down or fail individual operations.
pub trait ConfigStore: Send + Sync {
    /// Read a whole file
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Write a whole file, replacing any previous content
    fn write(&self, path: &Path, contents: &[u8]) -> StorageResult<()>;

    /// Check whether a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Last modification time of a file
    fn modified(&self, path: &Path) -> StorageResult<SystemTime>;

    /// Create a directory and its parents
    fn create_dir_all(&self, path: &Path) -> StorageResult<()>;
}

/// [`ConfigStore`] on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigStore for FileStore {
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        std::fs::read(path)
            .map_err(|e| StorageError::io_error(path.to_path_buf(), IoOperation::Read, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> StorageResult<()> {
        std::fs::write(path, contents)
            .map_err(|e| StorageError::io_error(path.to_path_buf(), IoOperation::Write, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn modified(&self, path: &Path) -> StorageResult<SystemTime> {
        std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| StorageError::io_error(path.to_path_buf(), IoOperation::Metadata, e))
    }

    fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
        std::fs::create_dir_all(path)
            .map_err(|e| StorageError::directory_creation_failed(path.to_path_buf(), e))
    }
}
