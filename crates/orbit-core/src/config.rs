//! Host configuration: defaults, environment overrides and TOML loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::log::{ConsoleKind, LogLevel};

/// Default values.
pub mod defaults {
    /// Fixed name of the log file written by the file sink.
    pub const LOG_FILE_NAME: &str = "orbit.logs";

    /// Name of the plugin directory, both local and under the resources path.
    pub const PLUGINS_DIR: &str = "plugins";

    /// Resources path baked in at build time, overridable at runtime.
    pub const RESOURCES_PATH: &str = match option_env!("ORBIT_RESOURCES_PATH") {
        Some(path) => path,
        None => "/usr/share/orbit",
    };
}

/// Environment variable names.
pub mod env_vars {
    /// Resources directory holding the fallback `plugins` directory.
    pub const RESOURCES_PATH: &str = "ORBIT_RESOURCES_PATH";
    /// Logger threshold.
    pub const LOG_LEVEL: &str = "ORBIT_LOG_LEVEL";
    /// Console sink threshold.
    pub const CONSOLE_LEVEL: &str = "ORBIT_CONSOLE_LEVEL";
    /// File sink threshold.
    pub const FILE_LEVEL: &str = "ORBIT_FILE_LEVEL";
    /// Enables the file sink when truthy.
    pub const LOG_FILE: &str = "ORBIT_LOG_FILE";
    /// Console sink kind (`auto`, `ansi`, `attributes`, `syslog`).
    pub const CONSOLE: &str = "ORBIT_CONSOLE";
}

/// Startup configuration of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory whose `plugins` subdirectory is scanned when `./plugins` is missing.
    pub resources_path: PathBuf,
    /// Logger threshold.
    pub logger_level: LogLevel,
    /// Console sink threshold.
    pub console_level: LogLevel,
    /// File sink threshold.
    pub file_level: LogLevel,
    /// Whether the file sink is added at startup.
    pub file_logging: bool,
    /// Console sink kind.
    pub console: ConsoleKind,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            resources_path: PathBuf::from(defaults::RESOURCES_PATH),
            logger_level: LogLevel::Trace,
            console_level: LogLevel::Trace,
            file_level: LogLevel::Trace,
            file_logging: false,
            console: ConsoleKind::Auto,
        }
    }
}

impl HostConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the names in [`env_vars`].
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup(env_vars::RESOURCES_PATH) {
            self.resources_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(env_vars::LOG_LEVEL) {
            self.logger_level = level.parse()?;
        }
        if let Some(level) = lookup(env_vars::CONSOLE_LEVEL) {
            self.console_level = level.parse()?;
        }
        if let Some(level) = lookup(env_vars::FILE_LEVEL) {
            self.file_level = level.parse()?;
        }
        if let Some(flag) = lookup(env_vars::LOG_FILE) {
            self.file_logging = parse_flag(&flag);
        }
        if let Some(kind) = lookup(env_vars::CONSOLE) {
            self.console = kind.parse()?;
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
