use crate::log::level::LogLevel;

/// A single log event as handed to every sink.
///
/// Built fresh for each [`Logger::log`](crate::log::Logger::log) call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Severity of the message.
    pub level: LogLevel,
    /// Message text, without the timestamp or level code.
    pub text: String,
}

impl LogMessage {
    /// Creates a new `LogMessage`.
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}
