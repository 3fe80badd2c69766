//! Unified error handling for the Orbit host core.

use crate::plugin::PluginError;

/// Unified error type for Orbit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors outside of plugin loading (log files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Plugin loading errors.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Result type alias for Orbit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<crate::log::ParseLevelError> for Error {
    fn from(err: crate::log::ParseLevelError) -> Self {
        Error::Config(err.to_string())
    }
}
