//! Injected logging collaborator.
//!
//! Components never call the global `log` macros directly; they receive a
//! [`SharedLogger`] at construction. [`LogFacade`] forwards to the `log`
//! crate so binaries keep their usual `env_logger` setup, while
//! [`RecordingLogger`] lets tests observe what was reported.

use std::sync::{Arc, Mutex};

pub use log::Level;

/// Logger shared between the components of one conversion run.
pub type SharedLogger = Arc<dyn Logger>;

/// Sink for diagnostic messages emitted during extraction and rendering.
pub trait Logger: Send + Sync {
    /// Record a message at the given level.
    fn log(&self, level: Level, message: &str);

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// Forwards messages to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogFacade {
    target: &'static str,
}

impl LogFacade {
    /// Create a facade logging under the `relayout` target.
    pub fn new() -> Self {
        Self { target: "relayout" }
    }

    /// Create a facade logging under a custom target.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    /// Wrap a new facade in a [`SharedLogger`].
    pub fn shared() -> SharedLogger {
        Arc::new(Self::new())
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{}", message);
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// A captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records captured so far.
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of records captured at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.records().iter().filter(|r| r.level == level).count()
    }

    /// Messages captured at exactly `level`, in order.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.message)
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        let record = LogRecord {
            level,
            message: message.to_string(),
        };
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
