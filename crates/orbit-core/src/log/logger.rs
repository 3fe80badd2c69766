//! The logger: a threshold plus an ordered list of sinks.

use parking_lot::RwLock;

use crate::log::level::{LevelCell, LogLevel};
use crate::log::message::LogMessage;
use crate::log::sink::{same_sink, DynSink};

/// Fans messages out to an ordered list of sinks.
///
/// Filtering happens in two stages. A message below the logger threshold is discarded
/// before any sink is consulted; a message that passes is offered to every sink in
/// insertion order, and each sink applies its own threshold.
///
/// All methods take `&self`. The sink list sits behind a read/write lock and `log`
/// works on a snapshot of it, so sinks may be added or removed concurrently and a sink
/// may itself log without deadlocking.
pub struct Logger {
    level: LevelCell,
    sinks: RwLock<Vec<DynSink>>,
}

impl Logger {
    /// Logger with no sinks and a trace threshold.
    pub fn new() -> Self {
        Self::with_level(LogLevel::Trace)
    }

    /// Logger with no sinks and the given threshold.
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level: LevelCell::new(level),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Current logger threshold.
    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    /// Replace the logger threshold.
    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    /// Append `sink`; duplicates are allowed.
    pub fn add_sink(&self, sink: DynSink) {
        self.sinks.write().push(sink);
    }

    /// Remove the most recently added entry that is the same object as `sink`.
    ///
    /// Returns whether an entry was removed.
    pub fn del_sink(&self, sink: &DynSink) -> bool {
        let mut sinks = self.sinks.write();
        match sinks.iter().rposition(|s| same_sink(s, sink)) {
            Some(index) => {
                sinks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered sink entries.
    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Snapshot of the registered sinks, in emission order.
    pub fn sinks(&self) -> Vec<DynSink> {
        self.sinks.read().clone()
    }

    /// Log `text` at `level`.
    pub fn log(&self, level: LogLevel, text: impl Into<String>) {
        if level < self.level.get() {
            return;
        }
        let msg = LogMessage::new(level, text);
        for sink in self.sinks() {
            sink.receive(&msg);
        }
    }

    /// Log at trace level.
    pub fn trace(&self, text: impl Into<String>) {
        self.log(LogLevel::Trace, text);
    }

    /// Log at debug level.
    pub fn debug(&self, text: impl Into<String>) {
        self.log(LogLevel::Debug, text);
    }

    /// Log at info level.
    pub fn info(&self, text: impl Into<String>) {
        self.log(LogLevel::Info, text);
    }

    /// Log at warn level.
    pub fn warn(&self, text: impl Into<String>) {
        self.log(LogLevel::Warn, text);
    }

    /// Log at error level.
    pub fn error(&self, text: impl Into<String>) {
        self.log(LogLevel::Error, text);
    }

    /// Log at critical level.
    pub fn critical(&self, text: impl Into<String>) {
        self.log(LogLevel::Critical, text);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("sinks", &self.sink_count())
            .finish()
    }
}
