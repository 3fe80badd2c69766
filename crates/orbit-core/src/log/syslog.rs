//! Mobile system-log sink.
//!
//! Only the message text is forwarded; the platform log adds its own timestamp and
//! priority column.

use crate::log::level::{LevelCell, LogLevel};
use crate::log::message::LogMessage;
use crate::log::sink::Sink;

/// Tag attached to every system-log entry.
pub const SYSLOG_TAG: &str = "Orbit";

/// Android log priorities, as in `android/log.h`.
pub mod priority {
    /// `ANDROID_LOG_VERBOSE`
    pub const VERBOSE: i32 = 2;
    /// `ANDROID_LOG_DEBUG`
    pub const DEBUG: i32 = 3;
    /// `ANDROID_LOG_INFO`
    pub const INFO: i32 = 4;
    /// `ANDROID_LOG_WARN`
    pub const WARN: i32 = 5;
    /// `ANDROID_LOG_ERROR`
    pub const ERROR: i32 = 6;
    /// `ANDROID_LOG_FATAL`
    pub const FATAL: i32 = 7;
}

/// System-log priority for `level`.
pub fn syslog_priority(level: LogLevel) -> i32 {
    match level {
        LogLevel::Trace => priority::VERBOSE,
        LogLevel::Debug => priority::DEBUG,
        LogLevel::Info => priority::INFO,
        LogLevel::Warn => priority::WARN,
        LogLevel::Error => priority::ERROR,
        LogLevel::Critical => priority::FATAL,
    }
}

/// A platform log facility.
pub trait SystemLog: Send + Sync {
    /// Write one entry. Failures are ignored.
    fn write(&self, priority: i32, tag: &str, text: &str);
}

/// The running platform's log facility.
///
/// On Android this is `liblog`; elsewhere entries go to the error stream as
/// `tag: text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSystemLog;

#[cfg(target_os = "android")]
mod android {
    use std::ffi::CString;
    use std::os::raw::{c_char, c_int};

    #[link(name = "log")]
    extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    pub(super) fn write(priority: i32, tag: &str, text: &str) {
        let (Ok(tag), Ok(text)) = (CString::new(tag), CString::new(text.replace('\0', ""))) else {
            return;
        };
        // SAFETY: both pointers come from live CStrings for the duration of the call.
        unsafe {
            __android_log_write(priority, tag.as_ptr(), text.as_ptr());
        }
    }
}

impl SystemLog for NativeSystemLog {
    #[cfg(target_os = "android")]
    fn write(&self, priority: i32, tag: &str, text: &str) {
        android::write(priority, tag, text);
    }

    #[cfg(not(target_os = "android"))]
    fn write(&self, _priority: i32, tag: &str, text: &str) {
        use std::io::Write;

        let _ = writeln!(std::io::stderr().lock(), "{tag}: {text}");
    }
}

/// Sink forwarding message text to a [`SystemLog`].
pub struct SystemLogSink<L: SystemLog = NativeSystemLog> {
    level: LevelCell,
    log: L,
}

impl<L: SystemLog> SystemLogSink<L> {
    /// Sink writing to `log`.
    pub fn new(log: L) -> Self {
        Self {
            level: LevelCell::default(),
            log,
        }
    }
}

impl<L: SystemLog> Sink for SystemLogSink<L> {
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
        self.log
            .write(syslog_priority(msg.level), SYSLOG_TAG, &msg.text);
    }
}
