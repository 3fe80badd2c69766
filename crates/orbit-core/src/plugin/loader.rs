//! Native module loader using libloading.

use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::plugin::declaration::{FirstPlugin, PluginDeclaration, LOADER_SYMBOL, PLUGIN_ABI_VERSION};
use crate::plugin::{Plugin, PluginContext, PluginError, Result, SharedPlugin};

/// Turns a module path into an initialized plugin.
///
/// Discovery goes through this trait so the directory walk can be exercised without
/// real shared libraries.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path, ctx: &PluginContext) -> Result<SharedPlugin>;
}

/// Loader for real shared libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeModuleLoader;

impl ModuleLoader for NativeModuleLoader {
    fn load(&self, path: &Path, ctx: &PluginContext) -> Result<SharedPlugin> {
        load_plugin(path, ctx)
    }
}

/// Load the module at `path`, take the plugin it registers and initialize it.
///
/// On success the module stays mapped for the rest of the process.
pub fn load_plugin(path: impl AsRef<Path>, ctx: &PluginContext) -> Result<SharedPlugin> {
    let path = path.as_ref();
    let logger = &ctx.logger;
    logger.trace(format!("Loading plugin {}...", path.display()));

    // SAFETY: running the module's initializers is what loading a plugin means; the
    // host trusts the modules it finds in its plugin directory.
    // Binds lazily on Unix (RTLD_LAZY | RTLD_LOCAL).
    let library = unsafe { Library::new(path) }.map_err(|source| PluginError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    // SAFETY: the symbol is only used as an address here; nothing is read through it
    // until `read_declaration` has checked the ABI version.
    let declaration = match unsafe { library.get::<*const PluginDeclaration>(LOADER_SYMBOL) } {
        Ok(symbol) => read_declaration(path, &symbol)?,
        Err(err) => {
            let reason = err.to_string();
            logger.warn(format!(
                "Possible error loading symbols from plugin {}: {}",
                path.display(),
                reason
            ));
            return Err(PluginError::MissingDeclaration {
                path: path.to_path_buf(),
                reason,
            });
        }
    };

    let mut plugin = instantiate(path, &declaration, ctx)?;

    // The plugin's code and vtable live in the module.
    std::mem::forget(library);

    plugin.init(ctx);
    logger.trace(format!("Plugin {} loaded!", plugin.id()));

    Ok(Arc::from(plugin))
}

/// Check a declaration and run its registration function.
///
/// Returns the first plugin registered, not yet initialized. Version drift of the core
/// and extra registrations are logged at Warn.
pub fn instantiate(
    path: &Path,
    declaration: &PluginDeclaration,
    ctx: &PluginContext,
) -> Result<Box<dyn Plugin>> {
    check_abi(path, declaration.abi_version)?;

    let logger = &ctx.logger;
    if declaration.core_version != crate::CORE_VERSION {
        logger.warn(format!(
            "Plugin {} was built against orbit-core {}, host runs {}",
            path.display(),
            declaration.core_version,
            crate::CORE_VERSION
        ));
    }

    let mut registrar = FirstPlugin::default();
    (declaration.register)(&mut registrar);

    let Some(plugin) = registrar.plugin else {
        return Err(PluginError::NoPlugin(path.to_path_buf()));
    };

    for id in &registrar.dropped {
        logger.warn(format!(
            "Plugin {} registered more than one plugin, dropping {}",
            path.display(),
            id
        ));
    }

    Ok(plugin)
}

fn check_abi(path: &Path, found: u32) -> Result<()> {
    if found == PLUGIN_ABI_VERSION {
        Ok(())
    } else {
        Err(PluginError::AbiMismatch {
            path: path.to_path_buf(),
            expected: PLUGIN_ABI_VERSION,
            found,
        })
    }
}

/// Copy the exported declaration out of the module, reading the ABI version alone first.
fn read_declaration(
    path: &Path,
    symbol: &Symbol<'_, *const PluginDeclaration>,
) -> Result<PluginDeclaration> {
    // The symbol resolves to the address of the exported static.
    let declaration: *const PluginDeclaration = **symbol;

    // SAFETY: `abi_version` is the leading `u32` of a `repr(C)` struct, at offset 0 in
    // every layout version; no other field is touched.
    let abi_version = unsafe { std::ptr::addr_of!((*declaration).abi_version).read() };
    check_abi(path, abi_version)?;

    // SAFETY: the ABI version matches, so the static has this build's layout.
    Ok(unsafe { *declaration })
}
