//! Four-level logging sink used by the configuration manager

use std::fmt;

use parking_lot::Mutex;

/// Severity of a logged message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Severe,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Severe => write!(f, "SEVERE"),
        }
    }
}

/// Receiver of operational and validation messages
pub trait ConfigLogger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warning(&self, message: &str);
    fn severe(&self, message: &str);

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => self.debug(message),
            LogLevel::Info => self.info(message),
            LogLevel::Warning => self.warning(message),
            LogLevel::Severe => self.severe(message),
        }
    }
}

/// Forwards to `tracing` under a fixed target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ConfigLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "keystone::config", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "keystone::config", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "keystone::config", "{}", message);
    }

    fn severe(&self, message: &str) {
        tracing::error!(target: "keystone::config", "{}", message);
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in the order they were logged
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().clone()
    }

    /// Messages logged at one level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of messages containing `needle`, at any level
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push((level, message.to_string()));
    }
}

impl ConfigLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn warning(&self, message: &str) {
        self.push(LogLevel::Warning, message);
    }

    fn severe(&self, message: &str) {
        self.push(LogLevel::Severe, message);
    }
}
