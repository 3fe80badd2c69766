//! Dynamic plugin system.
//!
//! Plugins are native modules (`.so`, `.dylib`, `.dll`) exporting a
//! [`PluginDeclaration`] under the symbol `loader`. The host opens each module, lets it
//! register exactly one [`Plugin`], initializes it with a [`PluginContext`] and keeps it
//! in the [`PluginRegistry`] under its identity.
//!
//! Modules are never unloaded: code and vtables of a loaded plugin stay mapped until the
//! process exits.

pub mod declaration;
pub mod discovery;
pub mod loader;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HostConfig;
use crate::eventbus::SharedEventBus;
use crate::log::Logger;

pub use declaration::{PluginDeclaration, PluginRegistrar, LOADER_SYMBOL, PLUGIN_ABI_VERSION};
pub use discovery::{is_plugin_candidate, load_plugins, resolve_plugins_dir, scan_plugins};
pub use loader::{load_plugin, ModuleLoader, NativeModuleLoader};
pub use registry::PluginRegistry;

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Plugin error types.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The module could not be opened.
    #[error("Failed to open plugin module {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The module does not export a `loader` declaration.
    #[error("Plugin module {} has no loader declaration: {reason}", path.display())]
    MissingDeclaration { path: PathBuf, reason: String },

    /// The declaration was built for another plugin ABI.
    #[error("Plugin ABI mismatch in {}: expected {expected}, found {found}", path.display())]
    AbiMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    /// The module ran its registration function without handing over a plugin.
    #[error("Plugin module {} registered no plugin", .0.display())]
    NoPlugin(PathBuf),

    /// The path does not name a regular file.
    #[error("Not a plugin file: {}", .0.display())]
    NotAFile(PathBuf),
}

/// A unit of functionality provided by a dynamically loaded module.
///
/// The concrete type lives inside the module; the host only sees this trait object.
pub trait Plugin: Send + Sync {
    /// Identity used as the registry key.
    fn id(&self) -> String;

    /// Called once, right after loading and before the plugin is shared.
    ///
    /// This is where a plugin subscribes to the event bus and announces itself.
    fn init(&mut self, ctx: &PluginContext);
}

/// Shared plugin handle as stored in the registry.
pub type SharedPlugin = Arc<dyn Plugin>;

/// What a plugin can reach during [`Plugin::init`].
#[derive(Clone)]
pub struct PluginContext {
    /// Host logger; plugins log through the same sink chain as the host.
    pub logger: Arc<Logger>,
    /// Host event bus.
    pub event_bus: SharedEventBus,
    /// Startup configuration of the host.
    pub config: Arc<HostConfig>,
}

impl PluginContext {
    /// Context over the given host services.
    pub fn new(logger: Arc<Logger>, event_bus: SharedEventBus, config: Arc<HostConfig>) -> Self {
        Self {
            logger,
            event_bus,
            config,
        }
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("logger", &self.logger)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = PluginError::AbiMismatch {
            path: PathBuf::from("plugins/gps.so"),
            expected: 1,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "Plugin ABI mismatch in plugins/gps.so: expected 1, found 7"
        );

        let err = PluginError::NoPlugin(PathBuf::from("empty.so"));
        assert_eq!(err.to_string(), "Plugin module empty.so registered no plugin");
    }
}
