//! Plain-text file sink.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::defaults;
use crate::log::level::{LevelCell, LogLevel};
use crate::log::message::LogMessage;
use crate::log::sink::Sink;

/// Sink writing plain lines to a file, flushed after every line.
///
/// The synchronous flush keeps the log complete up to the last line even when the
/// process dies right after writing it.
pub struct FileSink {
    level: LevelCell,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Create (or truncate) the fixed log file in the working directory.
    pub fn open_default() -> std::io::Result<Self> {
        Self::create(defaults::LOG_FILE_NAME)
    }

    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self {
            level: LevelCell::default(),
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
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
        let mut file = self.file.lock();
        let _ = file.write_all(line.text.as_bytes());
        let _ = file.flush();
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.file.get_mut().sync_all();
    }
}
