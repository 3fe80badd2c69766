//! Plugin discovery: locate the plugin directory, walk it and load every module found.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use crate::config::defaults::PLUGINS_DIR;
use crate::context::HostContext;
use crate::log::Logger;
use crate::plugin::loader::{ModuleLoader, NativeModuleLoader};
use crate::plugin::registry::PluginRegistry;
use crate::plugin::PluginContext;

/// `<cwd>/plugins` if it exists, otherwise `<resources_path>/plugins`.
pub fn resolve_plugins_dir(cwd: &Path, resources_path: &Path) -> PathBuf {
    let local = cwd.join(PLUGINS_DIR);
    if local.exists() {
        local
    } else {
        resources_path.join(PLUGINS_DIR)
    }
}

/// Whether the file name carries the platform shared-library suffix anywhere in it,
/// so versioned names like `libgps.so.1` qualify.
pub fn is_plugin_candidate(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(std::env::consts::DLL_SUFFIX))
        .unwrap_or(false)
}

/// Discover and load the host's plugins into its registry.
///
/// Returns the number of modules loaded. Failures are logged, never returned: one bad
/// module does not keep the others from loading.
pub fn load_plugins(host: &HostContext) -> usize {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let dir = resolve_plugins_dir(&cwd, &host.config().resources_path);
    scan_plugins(&dir, &NativeModuleLoader, &host.plugin_context(), host.plugins())
}

/// Walk `dir` recursively, load every candidate through `loader` and insert the result
/// into `registry` by identity. A later plugin with an identity already present
/// replaces the earlier one.
pub fn scan_plugins(
    dir: &Path,
    loader: &dyn ModuleLoader,
    ctx: &PluginContext,
    registry: &PluginRegistry,
) -> usize {
    let logger = &ctx.logger;
    logger.info(format!("Loading plugins from {}", dir.display()));

    let mut loaded = 0;
    walk(dir, logger, &mut |path| {
        if !is_plugin_candidate(path) {
            return;
        }
        if !path.is_file() {
            logger.error(format!("File {} is not a valid plugin!", path.display()));
            return;
        }
        match loader.load(path, ctx) {
            Ok(plugin) => {
                registry.insert(plugin);
                loaded += 1;
            }
            Err(err) => logger.error(err.to_string()),
        }
    });

    if !registry.is_empty() {
        logger.debug(format!("Loaded plugins ({}) : ", registry.len()));
        for id in registry.ids() {
            logger.debug(format!(" - {id}"));
        }
    }

    loaded
}

/// Depth-first walk calling `visit` for every non-directory entry, in file name order.
/// Symlinks to directories are skipped, never followed into; other symlinks are
/// reported as entries.
fn walk(dir: &Path, logger: &Logger, visit: &mut dyn FnMut(&Path)) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            logger.critical(format!("{}: {}", dir.display(), err));
            return;
        }
    };

    let mut children: Vec<DirEntry> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry),
            Err(err) => logger.critical(format!("{}: {}", dir.display(), err)),
        }
    }
    children.sort_by_key(|entry| entry.file_name());

    for entry in children {
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => walk(&path, logger, visit),
            // `is_dir` follows the link.
            Ok(kind) if kind.is_symlink() && path.is_dir() => {}
            Ok(_) => visit(&path),
            Err(err) => logger.critical(format!("{}: {}", path.display(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_matching() {
        let suffix = std::env::consts::DLL_SUFFIX;
        assert!(is_plugin_candidate(Path::new(&format!("gps{suffix}"))));
        assert!(is_plugin_candidate(Path::new(&format!("dir/libgps{suffix}.1"))));
        assert!(!is_plugin_candidate(Path::new("readme.txt")));
        assert!(!is_plugin_candidate(Path::new("")));
    }

    #[test]
    fn test_resolve_prefers_local_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let resources = tempfile::tempdir().unwrap();

        assert_eq!(
            resolve_plugins_dir(cwd.path(), resources.path()),
            resources.path().join("plugins")
        );

        fs::create_dir(cwd.path().join("plugins")).unwrap();
        assert_eq!(
            resolve_plugins_dir(cwd.path(), resources.path()),
            cwd.path().join("plugins")
        );
    }
}
