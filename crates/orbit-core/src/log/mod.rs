//! Multi-sink logging shared by the host and every loaded plugin.
//!
//! A [`Logger`] owns a threshold and an ordered list of [`Sink`]s. Each sink renders the
//! message its own way:
//!
//! - [`AnsiConsoleSink`]: colored lines on the error stream
//! - [`AttributeConsoleSink`]: plain lines colored through the console attribute API
//! - [`FileSink`]: plain lines in a file, flushed per line
//! - [`SystemLogSink`]: message text forwarded to the platform system log
//!
//! [`console_sink`] picks the console variant for the running platform.

pub mod console;
pub mod file;
pub mod format;
pub mod layer;
pub mod level;
pub mod logger;
pub mod memory;
pub mod message;
pub mod sink;
pub mod syslog;

pub use console::{
    console_sink, AnsiConsoleSink, AttributeConsoleSink, ConsoleAttributes, ConsoleKind,
    NativeConsole,
};
pub use file::FileSink;
pub use format::{render, render_at, RenderedLine};
pub use layer::LoggerLayer;
pub use level::{LevelCell, LogLevel, ParseLevelError};
pub use logger::Logger;
pub use memory::{MemorySink, SharedBuffer};
pub use message::LogMessage;
pub use sink::{same_sink, DynSink, Sink};
pub use syslog::{NativeSystemLog, SystemLog, SystemLogSink};
