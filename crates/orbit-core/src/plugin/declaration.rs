//! Descriptor table exported by plugin modules.

use crate::plugin::Plugin;

/// Version of the declaration layout and of the [`Plugin`] trait as seen across the
/// module boundary. Bumped on any incompatible change.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Unmangled name of the exported [`PluginDeclaration`] static.
pub const LOADER_SYMBOL: &[u8] = b"loader";

/// Static every plugin module exports under [`LOADER_SYMBOL`].
///
/// `abi_version` comes first and is checked before any other field is read. Use the
/// `export_plugin!` macro of the plugin SDK rather than building this by hand.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    pub abi_version: u32,
    /// Version of `orbit-core` the module was compiled against.
    pub core_version: &'static str,
    /// Hands the module's plugin over to the host.
    pub register: fn(&mut dyn PluginRegistrar),
}

impl PluginDeclaration {
    /// Declaration for the running core version.
    pub const fn new(register: fn(&mut dyn PluginRegistrar)) -> Self {
        Self {
            abi_version: PLUGIN_ABI_VERSION,
            core_version: crate::CORE_VERSION,
            register,
        }
    }
}

impl std::fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("abi_version", &self.abi_version)
            .field("core_version", &self.core_version)
            .finish_non_exhaustive()
    }
}

/// Receiver of the plugin a module constructs; ownership moves to the host.
pub trait PluginRegistrar {
    fn register_plugin(&mut self, plugin: Box<dyn Plugin>);
}

/// Registrar keeping the first plugin handed over.
#[derive(Default)]
pub(crate) struct FirstPlugin {
    pub(crate) plugin: Option<Box<dyn Plugin>>,
    pub(crate) dropped: Vec<String>,
}

impl PluginRegistrar for FirstPlugin {
    fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
        if self.plugin.is_none() {
            self.plugin = Some(plugin);
        } else {
            self.dropped.push(plugin.id());
        }
    }
}
