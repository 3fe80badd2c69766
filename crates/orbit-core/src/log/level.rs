//! Severity levels shared by the logger and every sink.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Severity of a log message, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Very fine-grained diagnostic events.
    #[default]
    Trace = 0,
    /// Events useful while debugging.
    Debug = 1,
    /// Coarse-grained progress of the application.
    Info = 2,
    /// Potentially harmful situations.
    Warn = 3,
    /// Errors that still allow the application to continue.
    Error = 4,
    /// Failures the application is unlikely to recover from.
    Critical = 5,
}

impl LogLevel {
    /// All levels, lowest severity first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Single-letter code used in rendered lines.
    pub fn code(self) -> char {
        match self {
            LogLevel::Trace => 'T',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
            LogLevel::Critical => 'C',
        }
    }

    /// Inverse of [`LogLevel::code`].
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }

    /// Lower-case level name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    /// Numeric severity, 0 for trace up to 5 for critical.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a numeric severity back, clamping anything above 5 to critical.
    pub fn from_u8(value: u8) -> Self {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .unwrap_or(LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let level = match normalized.as_str() {
            "trace" | "t" => LogLevel::Trace,
            "debug" | "d" => LogLevel::Debug,
            "info" | "i" => LogLevel::Info,
            "warn" | "warning" | "w" => LogLevel::Warn,
            "error" | "e" => LogLevel::Error,
            "critical" | "fatal" | "c" => LogLevel::Critical,
            _ => return Err(ParseLevelError(s.to_string())),
        };
        Ok(level)
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A mutable threshold that can be read and replaced through a shared reference.
#[derive(Debug)]
pub struct LevelCell(AtomicU8);

impl LevelCell {
    /// Create a threshold starting at `level`.
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    /// Current threshold.
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace the threshold.
    pub fn set(&self, level: LogLevel) {
        self.0.store(level.as_u8(), Ordering::Release);
    }

    /// Whether a message at `level` passes this threshold.
    pub fn allows(&self, level: LogLevel) -> bool {
        level >= self.get()
    }
}

impl Default for LevelCell {
    fn default() -> Self {
        Self::new(LogLevel::Trace)
    }
}
