//! In-memory sink and writer, used to capture output in tests and tooling.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::log::level::{LevelCell, LogLevel};
use crate::log::message::LogMessage;
use crate::log::sink::Sink;

/// Sink that keeps every accepted message and its plain rendering.
#[derive(Debug, Default)]
pub struct MemorySink {
    level: LevelCell,
    messages: Mutex<Vec<LogMessage>>,
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Empty sink accepting every level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty sink with the given threshold.
    pub fn with_level(level: LogLevel) -> Self {
        let sink = Self::default();
        sink.level.set(level);
        sink
    }

    /// Messages accepted so far, oldest first.
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages.lock().clone()
    }

    /// Plain rendered lines accepted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Texts of accepted messages at exactly `level`.
    pub fn texts_at(&self, level: LogLevel) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.level == level)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Number of accepted messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether nothing was accepted yet.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.messages.lock().clear();
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn level(&self) -> LogLevel {
        self.level.get()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    fn receive(&self, msg: &LogMessage) {
        if !self.accepts(msg) {
            return;
        }
        let line = self.render(msg, false);
        self.lines.lock().push(line.text);
        self.messages.lock().push(msg.clone());
    }
}

/// Cloneable byte buffer implementing [`Write`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Contents written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
