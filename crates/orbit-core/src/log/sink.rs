//! The sink capability.

use std::sync::Arc;

use crate::log::format::{self, RenderedLine};
use crate::log::level::LogLevel;
use crate::log::message::LogMessage;

/// An output target that renders log messages and emits those passing its threshold.
///
/// Implementations must never panic or surface I/O failures from [`Sink::receive`];
/// a failed write is dropped.
pub trait Sink: Send + Sync {
    /// Current threshold.
    fn level(&self) -> LogLevel;

    /// Replace the threshold; applies from the next `receive` on.
    fn set_level(&self, level: LogLevel);

    /// Render and emit `msg` if it passes the threshold.
    fn receive(&self, msg: &LogMessage);

    /// Render `msg`, optionally with ANSI color.
    fn render(&self, msg: &LogMessage, color: bool) -> RenderedLine {
        format::render(msg, color)
    }

    /// Whether `msg` passes this sink's threshold.
    fn accepts(&self, msg: &LogMessage) -> bool {
        msg.level >= self.level()
    }
}

/// Shared sink handle as stored by the [`Logger`](crate::log::Logger).
pub type DynSink = Arc<dyn Sink>;

/// Identity comparison between two sink handles (same underlying object).
pub fn same_sink(a: &DynSink, b: &DynSink) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
