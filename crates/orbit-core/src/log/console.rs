//! Console sinks and the runtime choice between them.
//!
//! Terminals that understand ANSI escapes get [`AnsiConsoleSink`]. Consoles that only
//! expose an attribute API get [`AttributeConsoleSink`], which splits each line at the
//! colorable segment and switches the foreground color between writes. Android routes
//! console output to the system log.

use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::log::level::{LevelCell, LogLevel};
use crate::log::message::LogMessage;
use crate::log::sink::{DynSink, Sink};
use crate::log::syslog::{NativeSystemLog, SystemLogSink};

/// Console attribute bits, laid out like the Win32 character attribute word.
pub mod attributes {
    /// Blue foreground bit.
    pub const FOREGROUND_BLUE: u16 = 0x0001;
    /// Green foreground bit.
    pub const FOREGROUND_GREEN: u16 = 0x0002;
    /// Red foreground bit.
    pub const FOREGROUND_RED: u16 = 0x0004;
    /// Bright foreground bit.
    pub const FOREGROUND_INTENSITY: u16 = 0x0008;
    /// Red background bit.
    pub const BACKGROUND_RED: u16 = 0x0040;
    /// Plain white foreground.
    pub const WHITE: u16 = FOREGROUND_RED | FOREGROUND_GREEN | FOREGROUND_BLUE;
    /// Bits left untouched when only the foreground changes.
    pub const PRESERVED_MASK: u16 = 0xfff0;
}

/// Foreground attributes used for `level`.
pub fn level_attributes(level: LogLevel) -> u16 {
    use attributes::*;

    match level {
        LogLevel::Trace => WHITE,
        LogLevel::Debug => FOREGROUND_GREEN | FOREGROUND_BLUE,
        LogLevel::Info => FOREGROUND_GREEN,
        LogLevel::Warn => FOREGROUND_RED | FOREGROUND_GREEN | FOREGROUND_INTENSITY,
        LogLevel::Error => FOREGROUND_RED | FOREGROUND_INTENSITY,
        LogLevel::Critical => BACKGROUND_RED | WHITE | FOREGROUND_INTENSITY,
    }
}

/// Read/write access to a console's attribute word.
pub trait ConsoleAttributes: Send + Sync {
    /// The current attribute word, or `None` if it cannot be read.
    fn current(&self) -> Option<u16>;

    /// Replace the attribute word.
    fn apply(&self, attributes: u16);
}

/// Switch the foreground to `foreground`, keeping every other attribute bit.
///
/// Returns the attribute word to restore afterwards. When the current attributes cannot
/// be read nothing is changed and plain white is returned.
pub fn set_foreground(console: &dyn ConsoleAttributes, foreground: u16) -> u16 {
    let Some(original) = console.current() else {
        return attributes::WHITE;
    };
    console.apply(foreground | (original & attributes::PRESERVED_MASK));
    original
}

/// Attribute access for the process's own console.
///
/// Only Windows has a console attribute API; elsewhere reads fail and writes are ignored,
/// which degrades [`AttributeConsoleSink`] to plain output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConsole;

#[cfg(windows)]
impl ConsoleAttributes for NativeConsole {
    fn current(&self) -> Option<u16> {
        use windows_sys::Win32::System::Console::{
            GetConsoleScreenBufferInfo, GetStdHandle, CONSOLE_SCREEN_BUFFER_INFO,
            STD_ERROR_HANDLE,
        };

        // SAFETY: the handle comes straight from GetStdHandle and `info` is a plain
        // out-parameter owned by this frame.
        unsafe {
            let handle = GetStdHandle(STD_ERROR_HANDLE);
            let mut info: CONSOLE_SCREEN_BUFFER_INFO = std::mem::zeroed();
            if GetConsoleScreenBufferInfo(handle, &mut info) == 0 {
                None
            } else {
                Some(info.wAttributes)
            }
        }
    }

    fn apply(&self, attributes: u16) {
        use windows_sys::Win32::System::Console::{
            GetStdHandle, SetConsoleTextAttribute, STD_ERROR_HANDLE,
        };

        // SAFETY: plain Win32 calls on the standard error handle.
        unsafe {
            SetConsoleTextAttribute(GetStdHandle(STD_ERROR_HANDLE), attributes);
        }
    }
}

#[cfg(not(windows))]
impl ConsoleAttributes for NativeConsole {
    fn current(&self) -> Option<u16> {
        None
    }

    fn apply(&self, _attributes: u16) {}
}

type Output = Mutex<Box<dyn Write + Send>>;

fn stderr_output() -> Output {
    Mutex::new(Box::new(io::stderr()))
}

/// Console sink embedding ANSI color sequences in each line.
pub struct AnsiConsoleSink {
    level: LevelCell,
    out: Output,
}

impl AnsiConsoleSink {
    /// Sink writing to the process error stream.
    pub fn stderr() -> Self {
        Self {
            level: LevelCell::default(),
            out: stderr_output(),
        }
    }

    /// Sink writing to an arbitrary stream.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            level: LevelCell::default(),
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl Sink for AnsiConsoleSink {
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
        let line = self.render(msg, true);
        let mut out = self.out.lock();
        let _ = out.write_all(line.text.as_bytes());
        let _ = out.flush();
    }
}

/// Console sink coloring through a console attribute API instead of escape sequences.
pub struct AttributeConsoleSink<C: ConsoleAttributes = NativeConsole> {
    level: LevelCell,
    console: C,
    out: Output,
}

impl AttributeConsoleSink<NativeConsole> {
    /// Sink writing to the process error stream and coloring the native console.
    pub fn stderr() -> Self {
        Self::new(NativeConsole, io::stderr())
    }
}

impl<C: ConsoleAttributes> AttributeConsoleSink<C> {
    /// Sink writing to `writer` and coloring through `console`.
    pub fn new(console: C, writer: impl Write + Send + 'static) -> Self {
        Self {
            level: LevelCell::default(),
            console,
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl<C: ConsoleAttributes> Sink for AttributeConsoleSink<C> {
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
        let (head, rest) = line
            .text
            .split_at(line.color_offset.min(line.text.len()));
        let (body, tail) = match rest.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (rest, ""),
        };

        let mut out = self.out.lock();
        let _ = out.write_all(head.as_bytes());
        let _ = out.flush();
        let saved = set_foreground(&self.console, level_attributes(msg.level));
        let _ = out.write_all(body.as_bytes());
        let _ = out.flush();
        self.console.apply(saved);
        let _ = out.write_all(tail.as_bytes());
        let _ = out.flush();
    }
}

/// Which console sink to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleKind {
    /// Pick from the running platform.
    #[default]
    Auto,
    /// ANSI escape sequences on the error stream.
    Ansi,
    /// Console attribute API around plain text.
    Attributes,
    /// Platform system log.
    Syslog,
}

impl ConsoleKind {
    /// Resolve `Auto` for the running platform; other kinds are returned unchanged.
    pub fn resolve(self) -> Self {
        match self {
            ConsoleKind::Auto => Self::for_platform(std::env::consts::OS, ansi_terminal_hint()),
            other => other,
        }
    }

    /// The console kind used on `os` (as in [`std::env::consts::OS`]).
    pub fn for_platform(os: &str, ansi_terminal: bool) -> Self {
        match os {
            "android" => ConsoleKind::Syslog,
            "windows" if !ansi_terminal => ConsoleKind::Attributes,
            _ => ConsoleKind::Ansi,
        }
    }
}

impl FromStr for ConsoleKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ConsoleKind::Auto),
            "ansi" => Ok(ConsoleKind::Ansi),
            "attributes" | "attr" => Ok(ConsoleKind::Attributes),
            "syslog" => Ok(ConsoleKind::Syslog),
            other => Err(crate::Error::Config(format!("Unknown console kind: {other}"))),
        }
    }
}

/// Terminals known to interpret ANSI sequences on Windows.
fn ansi_terminal_hint() -> bool {
    std::env::var_os("WT_SESSION").is_some() || std::env::var_os("TERM").is_some()
}

/// Build the console sink for `kind`, resolving `Auto` at runtime.
pub fn console_sink(kind: ConsoleKind) -> DynSink {
    match kind.resolve() {
        ConsoleKind::Attributes => Arc::new(AttributeConsoleSink::stderr()),
        ConsoleKind::Syslog => Arc::new(SystemLogSink::new(NativeSystemLog)),
        ConsoleKind::Ansi | ConsoleKind::Auto => Arc::new(AnsiConsoleSink::stderr()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::memory::SharedBuffer;

    #[derive(Default)]
    struct FakeConsole {
        word: Mutex<Option<u16>>,
        history: Mutex<Vec<u16>>,
    }

    impl ConsoleAttributes for FakeConsole {
        fn current(&self) -> Option<u16> {
            *self.word.lock()
        }

        fn apply(&self, attributes: u16) {
            self.history.lock().push(attributes);
            let mut word = self.word.lock();
            if word.is_some() {
                *word = Some(attributes);
            }
        }
    }

    #[test]
    fn test_set_foreground_preserves_other_bits() {
        let console = FakeConsole {
            word: Mutex::new(Some(0x00f7)),
            ..Default::default()
        };
        let saved = set_foreground(&console, attributes::FOREGROUND_GREEN);
        assert_eq!(saved, 0x00f7);
        assert_eq!(console.current(), Some(0x00f2));
    }

    #[test]
    fn test_set_foreground_defaults_to_white() {
        let console = FakeConsole::default();
        assert_eq!(
            set_foreground(&console, attributes::FOREGROUND_RED),
            attributes::WHITE
        );
        assert!(console.history.lock().is_empty());
    }

    #[test]
    fn test_attribute_sink_splits_and_restores() {
        let buffer = SharedBuffer::default();
        let console = FakeConsole {
            word: Mutex::new(Some(0x1017)),
            ..Default::default()
        };
        let sink = AttributeConsoleSink::new(console, buffer.clone());

        sink.receive(&LogMessage::new(LogLevel::Warn, "careful"));

        let text = buffer.contents();
        assert!(text.ends_with("] (W) careful\n"));
        assert!(!text.contains('\x1b'));

        let history = sink.console.history.lock().clone();
        let warn = level_attributes(LogLevel::Warn);
        assert_eq!(history, vec![warn | 0x1010, 0x1017]);
        assert_eq!(sink.console.current(), Some(0x1017));
    }

    #[test]
    fn test_attribute_sink_respects_threshold() {
        let buffer = SharedBuffer::default();
        let sink = AttributeConsoleSink::new(FakeConsole::default(), buffer.clone());
        sink.set_level(LogLevel::Error);
        sink.receive(&LogMessage::new(LogLevel::Warn, "quiet"));
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_ansi_sink_embeds_color() {
        let buffer = SharedBuffer::default();
        let sink = AnsiConsoleSink::with_writer(buffer.clone());
        sink.receive(&LogMessage::new(LogLevel::Info, "ready"));
        let text = buffer.contents();
        assert!(text.contains("\x1b[32m(I) ready\x1b[m\n"));
    }

    #[test]
    fn test_platform_selection() {
        assert_eq!(ConsoleKind::for_platform("linux", false), ConsoleKind::Ansi);
        assert_eq!(ConsoleKind::for_platform("macos", false), ConsoleKind::Ansi);
        assert_eq!(
            ConsoleKind::for_platform("windows", false),
            ConsoleKind::Attributes
        );
        assert_eq!(ConsoleKind::for_platform("windows", true), ConsoleKind::Ansi);
        assert_eq!(ConsoleKind::for_platform("android", true), ConsoleKind::Syslog);
        assert_eq!(ConsoleKind::Attributes.resolve(), ConsoleKind::Attributes);
        assert_ne!(ConsoleKind::Auto.resolve(), ConsoleKind::Auto);
    }

    #[test]
    fn test_console_kind_parse() {
        assert_eq!("ANSI".parse::<ConsoleKind>().unwrap(), ConsoleKind::Ansi);
        assert_eq!("attr".parse::<ConsoleKind>().unwrap(), ConsoleKind::Attributes);
        assert!("tty".parse::<ConsoleKind>().is_err());
    }
}
