//! Core of the Orbit host.
//!
//! This crate holds the pieces the host and every plugin share: the multi-sink
//! [`Logger`](log::Logger), the dynamic plugin loader and registry, the event bus and the
//! [`HostContext`] tying them together.

pub mod config;
pub mod context;
pub mod error;
pub mod eventbus;
pub mod log;
pub mod plugin;

/// Version of this crate, embedded in every plugin declaration.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::HostConfig;
pub use context::HostContext;
pub use error::{Error, Result};

// Event bus exports
pub use eventbus::{Event, EventBus, EventMetadata, SharedEventBus, SubscriptionId};

// Plugin exports
pub use plugin::{
    Plugin, PluginContext, PluginDeclaration, PluginError, PluginRegistrar, PluginRegistry,
    SharedPlugin,
};

/// Re-exports commonly used types.
pub mod prelude {
    // Configuration
    pub use crate::config::{defaults, env_vars, HostConfig};

    // Error handling
    pub use crate::error::{Error, Result};

    // Logging
    pub use crate::log::{DynSink, LogLevel, LogMessage, Logger, Sink};

    // Event bus
    pub use crate::eventbus::{Event, EventBus, EventMetadata, SharedEventBus};

    // Plugins
    pub use crate::plugin::{Plugin, PluginContext, PluginRegistrar, SharedPlugin};

    pub use crate::context::HostContext;
}
