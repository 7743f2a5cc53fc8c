//! Plain and gzip-compressed copies of configuration files

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use flate2::{write::GzEncoder, Compression};

use crate::{
    error::{IoOperation, StorageError, StorageResult},
    store::ConfigStore,
};

/// Suffix of the verbatim copy
pub const BACKUP_EXTENSION: &str = "bak";
/// Suffix of the compressed copy
pub const COMPRESSED_EXTENSION: &str = "gz";

/// Files written by one backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFiles {
    pub plain: PathBuf,
    pub compressed: PathBuf,
}

/// Writes `<name>.bak` and `<name>.gz` next to a configuration file
#[derive(Clone)]
pub struct BackupWriter {
    store: Arc<dyn ConfigStore>,
}

impl BackupWriter {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Backup paths for a configuration file, overwritten on every backup
    pub fn paths_for(source: &Path) -> BackupFiles {
        BackupFiles {
            plain: source.with_extension(BACKUP_EXTENSION),
            compressed: source.with_extension(COMPRESSED_EXTENSION),
        }
    }

    /// Copy `source` to both backup files
    ///
    /// The two copies are written independently: a failure writing one does not
    /// prevent the other. The first failure is returned.
    pub fn create_backup(&self, source: &Path) -> StorageResult<BackupFiles> {
        let files = Self::paths_for(source);
        let contents = self.store.read(source)?;

        let plain = self.store.write(&files.plain, &contents);
        let compressed = compress(&files.compressed, &contents)
            .and_then(|bytes| self.store.write(&files.compressed, &bytes));

        plain.and(compressed).map(|_| files)
    }
}

fn compress(target: &Path, contents: &[u8]) -> StorageResult<Vec<u8>> {
    let compress_err =
        |e: std::io::Error| StorageError::io_error(target.to_path_buf(), IoOperation::Compress, e);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}
