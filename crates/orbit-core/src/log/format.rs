//! Line rendering shared by all sinks.
//!
//! Every line has the shape `[HH:MM:SS - DD/MM/YYYY] (L) text\n` with a UTC timestamp.
//! The colored variant wraps the `(L) text` segment in an ANSI sequence and ends it with
//! a reset before the newline.

use chrono::{DateTime, Utc};

use crate::log::level::LogLevel;
use crate::log::message::LogMessage;

/// ANSI reset sequence closing a colored segment.
pub const ANSI_RESET: &str = "\x1b[m";

/// ANSI sequence opening the colored segment for `level`.
pub fn ansi_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "\x1b[37m",
        LogLevel::Debug => "\x1b[36m",
        LogLevel::Info => "\x1b[32m",
        LogLevel::Warn => "\x1b[33m\x1b[1m",
        LogLevel::Error => "\x1b[31m\x1b[1m",
        LogLevel::Critical => "\x1b[1m\x1b[41m",
    }
}

/// A rendered line plus the byte offset of its colorable segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The full line, newline included.
    pub text: String,
    /// Byte index where the `(L) text` segment (or its color prefix) starts.
    pub color_offset: usize,
}

/// Render `msg` with the current UTC time.
pub fn render(msg: &LogMessage, color: bool) -> RenderedLine {
    render_at(msg, Utc::now(), color)
}

/// Render `msg` stamped with `at`.
pub fn render_at(msg: &LogMessage, at: DateTime<Utc>, color: bool) -> RenderedLine {
    let timestamp = at.format("%H:%M:%S - %d/%m/%Y").to_string();
    // "[" + timestamp + "] "
    let color_offset = timestamp.len() + 3;

    let text = if color {
        format!(
            "[{}] {}({}) {}{}\n",
            timestamp,
            ansi_color(msg.level),
            msg.level.code(),
            msg.text,
            ANSI_RESET
        )
    } else {
        format!("[{}] ({}) {}\n", timestamp, msg.level.code(), msg.text)
    };

    RenderedLine { text, color_offset }
}
