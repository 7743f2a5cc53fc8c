//! Lifecycle management of named configuration documents
//!
//! The [`ConfigManager`] keeps one record per document name holding the cached
//! document, its backing file, the last observed modification time, an
//! optional validator and a consecutive error count. Each record sits behind
//! its own lock, so operations on one name are serialized while different
//! names proceed independently.
//!
//! In-flight asynchronous saves are tracked outside the records. Shutdown and
//! maintenance never wait on a record lock without a bound, so one name stuck
//! in slow I/O cannot hold up the others.
//!
//! # Lifecycle
//!
//! ```text
//! Uncached ──load──▶ Cached ──file changed──▶ Stale ──reload──▶ Cached
//!                      │
//!                      └──maintenance expiry──▶ Evicted (next get loads again)
//! ```

use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Arc, Weak},
    time::{Duration, SystemTime},
};

use dashmap::DashMap;
use keystone_validation::{ValidationResult, Validator};
use parking_lot::{Mutex, RwLock};
use serde_yaml::Mapping;
use tokio::{sync::Semaphore, task::JoinHandle};

use crate::{
    backup::BackupWriter,
    clock::{Clock, SystemClock},
    document::ConfigDocument,
    error::{StorageError, StorageResult},
    logging::{ConfigLogger, TracingLogger},
    settings::ManagerSettings,
    store::{ConfigStore, FileStore},
};

/// Name of the document loaded by [`ConfigManager::start`]
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Handle to a cached document
///
/// The manager keeps the document up to date in place on reload, so a handle
/// stays valid for as long as the caller holds it.
pub type SharedDocument = Arc<RwLock<ConfigDocument>>;

/// Everything the manager tracks for one document name
struct ConfigEntry {
    document: Option<SharedDocument>,
    file_path: PathBuf,
    last_modified: Option<SystemTime>,
    validator: Option<Arc<Validator>>,
    error_count: u32,
}

impl ConfigEntry {
    fn new(file_path: PathBuf) -> Self {
        Self {
            document: None,
            file_path,
            last_modified: None,
            validator: None,
            error_count: 0,
        }
    }
}

/// Outcome of one maintenance pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Names whose cached document was dropped
    pub evicted: Vec<String>,
    /// Names whose backing file was backed up
    pub backed_up: Vec<String>,
    /// Names left for the next pass because another operation held them
    pub skipped: Vec<String>,
}

struct ManagerInner {
    settings: ManagerSettings,
    entries: DashMap<String, Arc<Mutex<ConfigEntry>>>,
    pending_saves: DashMap<String, JoinHandle<()>>,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn ConfigLogger>,
    backups: BackupWriter,
    defaults: Mapping,
    save_permits: Arc<Semaphore>,
    maintenance: Mutex<Option<JoinHandle<()>>>,
}

/// Cache, reload, backup and persistence of named configuration documents
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct ConfigManager {
    inner: Arc<ManagerInner>,
}

impl ConfigManager {
    /// Manager with the default collaborators
    pub fn new(settings: ManagerSettings) -> Self {
        Self::builder(settings).build()
    }

    pub fn builder(settings: ManagerSettings) -> ConfigManagerBuilder {
        ConfigManagerBuilder::new(settings)
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.inner.settings
    }

    /// Backing file of a named document
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.inner.settings.document_path(name)
    }

    /// Create the data directory, load the default document and start maintenance
    ///
    /// The default document is created from the builder's defaults when its
    /// file does not exist. Must be called from within a tokio runtime.
    pub fn start(&self) -> StorageResult<()> {
        let data_dir = &self.inner.settings.data_dir;
        self.inner.store.create_dir_all(data_dir)?;

        self.create_config(DEFAULT_CONFIG_NAME, &self.inner.defaults)?;
        self.start_maintenance()?;

        self.inner.logger.info(&format!(
            "Configuration manager started in {}",
            data_dir.display()
        ));
        Ok(())
    }

    /// Create a document from defaults, or load it when its file already exists
    ///
    /// Values on disk always win: defaults are only applied to a new file. A
    /// failure to write the new file is logged and the document is still cached.
    pub fn create_config(&self, name: &str, defaults: &Mapping) -> StorageResult<SharedDocument> {
        let entry = self.entry(name);
        let mut entry = entry.lock();
        let path = entry.file_path.clone();

        let document = if self.inner.store.exists(&path) {
            self.read_document(&path)?
        } else {
            let mut document = ConfigDocument::new(path.clone(), self.inner.settings.format);
            document.apply_defaults(defaults);
            if let Err(e) = self.write_document(&document) {
                self.inner
                    .logger
                    .severe(&format!("Failed to save new config {}: {}", name, e));
            }
            document
        };

        entry.last_modified = self.inner.store.modified(&path).ok();
        Ok(Self::cache_document(&mut entry, document))
    }

    /// Current document for a name
    ///
    /// A backing file newer than the last observed timestamp is reloaded first.
    /// When that reload fails the last cached document is returned, or the
    /// error when nothing is cached. A name never seen before is loaded from
    /// disk, or starts out empty when its file does not exist.
    pub fn get_config(&self, name: &str) -> StorageResult<SharedDocument> {
        let entry = self.entry(name);
        let mut entry = entry.lock();

        if self.is_modified(&entry) {
            return match self.reload_entry(name, &mut entry) {
                Ok((document, _)) => Ok(document),
                Err(e) => match &entry.document {
                    Some(cached) => {
                        self.inner.logger.warning(&format!(
                            "Serving cached config {} after failed reload: {}",
                            name, e
                        ));
                        Ok(Arc::clone(cached))
                    }
                    None => Err(e),
                },
            };
        }

        if let Some(cached) = &entry.document {
            return Ok(Arc::clone(cached));
        }

        let path = entry.file_path.clone();
        let document = if self.inner.store.exists(&path) {
            self.read_document(&path)?
        } else {
            ConfigDocument::new(path.clone(), self.inner.settings.format)
        };
        entry.last_modified = self.inner.store.modified(&path).ok();

        self.inner
            .logger
            .debug(&format!("Loaded config {} from {}", name, path.display()));
        Ok(Self::cache_document(&mut entry, document))
    }

    /// Write a cached document to its backing file
    ///
    /// Does nothing when the name is not cached. Failures are logged.
    pub fn save_config(&self, name: &str) {
        let Some(entry) = self.existing_entry(name) else {
            return;
        };
        let mut entry = entry.lock();
        self.save_entry(name, &mut entry);
    }

    /// Save a document on the background worker pool
    ///
    /// The save is remembered as the name's pending save, which shutdown waits
    /// for. Must be called from within a tokio runtime.
    pub fn save_config_async(&self, name: &str) -> StorageResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StorageError::internal(format!("No async runtime for save of {}: {}", name, e)))?;
        if self.existing_entry(name).is_none() {
            return Ok(());
        }

        let manager = self.clone();
        let logger = Arc::clone(&self.inner.logger);
        let permits = Arc::clone(&self.inner.save_permits);
        let task_name = name.to_string();
        let handle = runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let save_name = task_name.clone();
            let result = tokio::task::spawn_blocking(move || manager.save_config(&save_name)).await;
            if let Err(e) = result {
                logger.severe(&format!("Asynchronous save of {} panicked: {}", task_name, e));
            }
        });

        let previous = self.inner.pending_saves.insert(name.to_string(), handle);
        if previous.is_some_and(|previous| !previous.is_finished()) {
            self.inner
                .logger
                .debug(&format!("Replaced pending save of {}", name));
        }
        Ok(())
    }

    /// Save every cached document; one failure does not stop the others
    pub fn save_all(&self) {
        for (name, entry) in self.snapshot() {
            let mut entry = entry.lock();
            if entry.document.is_some() {
                self.save_entry(&name, &mut entry);
            }
        }
    }

    /// Back up the backing file, then load it again
    ///
    /// A registered validator runs against the reloaded document and its
    /// findings are logged. Invalid configuration is still loaded.
    pub fn reload_config(&self, name: &str) -> StorageResult<SharedDocument> {
        let entry = self.entry(name);
        let mut entry = entry.lock();
        self.reload_entry(name, &mut entry)
            .map(|(document, _)| document)
    }

    /// Like [`reload_config`](Self::reload_config), but fails when validation reports errors
    ///
    /// The reloaded document stays cached either way.
    pub fn reload_config_strict(&self, name: &str) -> StorageResult<SharedDocument> {
        let entry = self.entry(name);
        let mut entry = entry.lock();
        let (document, validation) = self.reload_entry(name, &mut entry)?;

        match validation {
            Some(result) if result.has_errors() => Err(StorageError::config(format!(
                "Configuration {} failed validation: {}",
                name, result
            ))),
            _ => Ok(document),
        }
    }

    /// Associate a validator with a name, replacing any previous one
    pub fn register_validator(&self, name: &str, validator: Validator) {
        let entry = self.entry(name);
        entry.lock().validator = Some(Arc::new(validator));
    }

    /// Drop the validator of a name, returning whether one was registered
    pub fn remove_validator(&self, name: &str) -> bool {
        self.existing_entry(name)
            .map(|entry| entry.lock().validator.take().is_some())
            .unwrap_or(false)
    }

    /// Run the registered validator against the cached document
    ///
    /// Without a validator the result is empty.
    pub fn validate_config(&self, name: &str) -> StorageResult<ValidationResult> {
        let entry = self
            .existing_entry(name)
            .ok_or_else(|| StorageError::not_found(format!("config {}", name)))?;
        let entry = entry.lock();
        let document = entry
            .document
            .as_ref()
            .ok_or_else(|| StorageError::not_found(format!("cached config {}", name)))?;

        let result = match &entry.validator {
            Some(validator) => validator.validate(&*document.read()),
            None => ValidationResult::new(),
        };
        Ok(result)
    }

    /// One maintenance pass: evict idle documents, back up changed files
    ///
    /// A document is idle when its last observed modification is older than
    /// the cache expiry. Names are handled independently; a name that another
    /// operation is holding is skipped until the next pass.
    pub fn run_maintenance(&self) -> MaintenanceReport {
        let now = self.inner.clock.now();
        let expiry = self.inner.settings.cache_expiry();
        let mut report = MaintenanceReport::default();

        for (name, entry) in self.snapshot() {
            let Some(mut entry) = entry.try_lock() else {
                self.inner
                    .logger
                    .debug(&format!("Config {} is busy, skipping it this maintenance pass", name));
                report.skipped.push(name);
                continue;
            };

            let idle = entry
                .last_modified
                .and_then(|last| now.duration_since(last).ok())
                .is_some_and(|age| age > expiry);
            if idle && entry.document.take().is_some() {
                self.inner
                    .logger
                    .debug(&format!("Evicted idle config {} from cache", name));
                report.evicted.push(name.clone());
            }

            if self.is_modified(&entry) {
                match self.inner.backups.create_backup(&entry.file_path) {
                    Ok(_) => report.backed_up.push(name.clone()),
                    Err(e) => self
                        .inner
                        .logger
                        .severe(&format!("Failed to create backup for {}: {}", name, e)),
                }
            }
        }

        report
    }

    /// Wait for pending saves, save everything, stop maintenance and forget all documents
    ///
    /// Each pending save gets the configured timeout. One that does not finish
    /// in time is logged and left behind, and its name is not saved again. The
    /// final save waits at most the same timeout for each remaining name.
    pub async fn shutdown(&self) {
        let timeout = self.inner.settings.shutdown_timeout();

        let names: Vec<String> = self
            .inner
            .pending_saves
            .iter()
            .map(|pending| pending.key().clone())
            .collect();

        let mut abandoned = HashSet::new();
        for name in names {
            let Some((name, handle)) = self.inner.pending_saves.remove(&name) else {
                continue;
            };
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self
                    .inner
                    .logger
                    .severe(&format!("Pending save of {} failed: {}", name, e)),
                Err(_) => {
                    self.inner.logger.severe(&format!(
                        "Timed out after {:?} waiting for pending save of {}",
                        timeout, name
                    ));
                    abandoned.insert(name);
                }
            }
        }

        let manager = self.clone();
        let final_save = move || manager.save_remaining(&abandoned, timeout);
        if let Err(e) = tokio::task::spawn_blocking(final_save).await {
            self.inner
                .logger
                .severe(&format!("Final save during shutdown failed: {}", e));
        }

        if let Some(task) = self.inner.maintenance.lock().take() {
            task.abort();
        }
        self.inner.pending_saves.clear();
        self.inner.entries.clear();
        self.inner.logger.info("Configuration manager shut down");
    }

    /// Names with a record, sorted
    pub fn tracked_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.existing_entry(name)
            .is_some_and(|entry| entry.lock().document.is_some())
    }

    /// Consecutive failed reloads of a name
    pub fn error_count(&self, name: &str) -> u32 {
        self.existing_entry(name)
            .map(|entry| entry.lock().error_count)
            .unwrap_or(0)
    }

    /// Whether the maintenance task is running
    pub fn is_running(&self) -> bool {
        self.inner
            .maintenance
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn start_maintenance(&self) -> StorageResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StorageError::internal(format!("No async runtime for maintenance: {}", e)))?;

        let mut slot = self.inner.maintenance.lock();
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return Ok(());
        }

        let period = self.inner.settings.maintenance_interval();
        let weak = Arc::downgrade(&self.inner);
        *slot = Some(runtime.spawn(maintenance_loop(weak, period)));
        Ok(())
    }

    fn entry(&self, name: &str) -> Arc<Mutex<ConfigEntry>> {
        self.inner
            .entries
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConfigEntry::new(self.config_path(name)))))
            .value()
            .clone()
    }

    fn existing_entry(&self, name: &str) -> Option<Arc<Mutex<ConfigEntry>>> {
        self.inner.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Final save of shutdown: bounded wait per name, abandoned names left alone
    fn save_remaining(&self, abandoned: &HashSet<String>, wait: Duration) {
        for (name, entry) in self.snapshot() {
            if abandoned.contains(&name) {
                self.inner
                    .logger
                    .debug(&format!("Leaving {} to its unfinished save", name));
                continue;
            }
            let Some(mut entry) = entry.try_lock_for(wait) else {
                self.inner.logger.severe(&format!(
                    "Skipped final save of {}: still busy after {:?}",
                    name, wait
                ));
                continue;
            };
            if entry.document.is_some() {
                self.save_entry(&name, &mut entry);
            }
        }
    }

    /// Records copied out of the map, so no map guard is held while working on them
    fn snapshot(&self) -> Vec<(String, Arc<Mutex<ConfigEntry>>)> {
        self.inner
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// The file changed on disk since it was last observed
    fn is_modified(&self, entry: &ConfigEntry) -> bool {
        let Some(last) = entry.last_modified else {
            return false;
        };
        self.inner.store.exists(&entry.file_path)
            && self
                .inner
                .store
                .modified(&entry.file_path)
                .is_ok_and(|modified| modified > last)
    }

    fn reload_entry(
        &self,
        name: &str,
        entry: &mut ConfigEntry,
    ) -> StorageResult<(SharedDocument, Option<ValidationResult>)> {
        let path = entry.file_path.clone();
        if !self.inner.store.exists(&path) {
            return Err(self.record_failure(
                name,
                entry,
                StorageError::not_found(format!("{} ({})", name, path.display())),
            ));
        }

        if let Err(e) = self.inner.backups.create_backup(&path) {
            self.inner.logger.severe(&format!(
                "Failed to create backup before reload of {}: {}",
                name, e
            ));
        }

        let document = match self.read_document(&path) {
            Ok(document) => document,
            Err(e) => return Err(self.record_failure(name, entry, e)),
        };

        entry.last_modified = self.inner.store.modified(&path).ok();
        entry.error_count = 0;
        let document = Self::cache_document(entry, document);
        self.inner
            .logger
            .debug(&format!("Reloaded config {} from {}", name, path.display()));

        let validation = entry.validator.as_ref().map(|validator| {
            let result = validator.validate(&*document.read());
            self.log_validation(name, &result);
            result
        });

        Ok((document, validation))
    }

    /// Count a failed reload; past the limit, accept the file's timestamp so it is not retried
    fn record_failure(&self, name: &str, entry: &mut ConfigEntry, error: StorageError) -> StorageError {
        entry.error_count += 1;
        self.inner.logger.warning(&format!(
            "Failed to reload config {} (attempt {}): {}",
            name, entry.error_count, error
        ));

        if entry.error_count >= self.inner.settings.max_errors {
            self.inner.logger.severe(&format!(
                "Config {} failed to reload {} times, keeping the last loaded version until the file changes",
                name, entry.error_count
            ));
            if let Ok(modified) = self.inner.store.modified(&entry.file_path) {
                entry.last_modified = Some(modified);
            }
        }

        error
    }

    fn log_validation(&self, name: &str, result: &ValidationResult) {
        let logger = &self.inner.logger;
        if result.has_errors() {
            logger.severe(&format!(
                "Configuration validation failed after reload: {}",
                name
            ));
            for error in result.errors() {
                logger.severe(error);
            }
        }
        for warning in result.warnings() {
            logger.warning(warning);
        }
        for suggestion in result.suggestions() {
            logger.info(suggestion);
        }
    }

    fn save_entry(&self, name: &str, entry: &mut ConfigEntry) {
        let Some(document) = entry.document.clone() else {
            return;
        };

        let result = self.write_document(&document.read());
        match result {
            Ok(()) => {
                entry.last_modified = self.inner.store.modified(&entry.file_path).ok();
                self.inner.logger.debug(&format!("Saved config {}", name));
            }
            Err(e) => self
                .inner
                .logger
                .severe(&format!("Failed to save config {}: {}", name, e)),
        }
    }

    fn read_document(&self, path: &std::path::Path) -> StorageResult<ConfigDocument> {
        let bytes = self.inner.store.read(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            StorageError::parse_error(
                path.to_path_buf(),
                self.inner.settings.format.to_string(),
                e.to_string(),
            )
        })?;
        ConfigDocument::parse(path, self.inner.settings.format, &content)
    }

    fn write_document(&self, document: &ConfigDocument) -> StorageResult<()> {
        let content = document.serialize()?;
        self.inner.store.write(document.path(), content.as_bytes())
    }

    /// Put a freshly loaded document in the cache, updating an existing handle in place
    fn cache_document(entry: &mut ConfigEntry, document: ConfigDocument) -> SharedDocument {
        match &entry.document {
            Some(cached) => {
                cached.write().replace_with(document);
                Arc::clone(cached)
            }
            None => {
                let shared = Arc::new(RwLock::new(document));
                entry.document = Some(Arc::clone(&shared));
                shared
            }
        }
    }
}

async fn maintenance_loop(weak: Weak<ManagerInner>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let Some(inner) = weak.upgrade() else {
            break;
        };
        let logger = Arc::clone(&inner.logger);
        let manager = ConfigManager { inner };

        match tokio::task::spawn_blocking(move || manager.run_maintenance()).await {
            Ok(report) => {
                if report != MaintenanceReport::default() {
                    logger.debug(&format!(
                        "Maintenance evicted {:?}, backed up {:?}, skipped {:?}",
                        report.evicted, report.backed_up, report.skipped
                    ));
                }
            }
            Err(e) => logger.severe(&format!("Maintenance pass failed: {}", e)),
        }
    }
}

/// Builder for [`ConfigManager`]
pub struct ConfigManagerBuilder {
    settings: ManagerSettings,
    store: Option<Arc<dyn ConfigStore>>,
    clock: Option<Arc<dyn Clock>>,
    logger: Option<Arc<dyn ConfigLogger>>,
    defaults: Mapping,
}

impl ConfigManagerBuilder {
    pub fn new(settings: ManagerSettings) -> Self {
        Self {
            settings,
            store: None,
            clock: None,
            logger: None,
            defaults: Mapping::new(),
        }
    }

    /// Set the filesystem backend
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the time source used for cache expiry
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the logging sink
    pub fn logger(mut self, logger: Arc<dyn ConfigLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Defaults for the document created by [`ConfigManager::start`]
    pub fn defaults(mut self, defaults: Mapping) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> ConfigManager {
        let store = self.store.unwrap_or_else(|| Arc::new(FileStore::new()));
        let workers = self.settings.save_workers.max(1);

        ConfigManager {
            inner: Arc::new(ManagerInner {
                backups: BackupWriter::new(Arc::clone(&store)),
                store,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
                defaults: self.defaults,
                save_permits: Arc::new(Semaphore::new(workers)),
                maintenance: Mutex::new(None),
                entries: DashMap::new(),
                pending_saves: DashMap::new(),
                settings: self.settings,
            }),
        }
    }
}
