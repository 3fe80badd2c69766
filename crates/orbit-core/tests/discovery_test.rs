//! Plugin discovery tests
//!
//! The directory walk runs against a fake module loader so no shared library has to be
//! built: every file the walk accepts is turned into a plugin named after its stem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use orbit_core::log::{LogLevel, Logger, MemorySink};
use orbit_core::plugin::{scan_plugins, ModuleLoader};
use orbit_core::{
    EventBus, HostConfig, Plugin, PluginContext, PluginError, PluginRegistry, SharedPlugin,
};

const SUFFIX: &str = std::env::consts::DLL_SUFFIX;

struct FakePlugin {
    id: String,
    initialized: bool,
}

impl Plugin for FakePlugin {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn init(&mut self, ctx: &PluginContext) {
        self.initialized = true;
        ctx.logger.info(format!("{} ready", self.id));
    }
}

/// Loads `<name>.<suffix>` as a plugin with identity `<name>`, or with the identity
/// written in the file when it is not empty. Files named `broken*` fail to load.
/// Every plugin handed out is recorded with its path, in load order.
#[derive(Default)]
struct FakeLoader {
    loaded: Mutex<Vec<(PathBuf, SharedPlugin)>>,
}

impl ModuleLoader for FakeLoader {
    fn load(&self, path: &Path, ctx: &PluginContext) -> orbit_core::plugin::Result<SharedPlugin> {
        let stem = path
            .file_name()
            .map(|name| name.to_string_lossy().replace(SUFFIX, ""))
            .unwrap_or_default();
        if stem.starts_with("broken") {
            return Err(PluginError::NoPlugin(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).unwrap_or_default();
        let id = if contents.trim().is_empty() {
            stem
        } else {
            contents.trim().to_string()
        };

        let mut plugin = FakePlugin {
            id,
            initialized: false,
        };
        plugin.init(ctx);
        assert!(plugin.initialized);

        let plugin: SharedPlugin = Arc::new(plugin);
        self.loaded.lock().push((path.to_path_buf(), plugin.clone()));
        Ok(plugin)
    }
}

fn context() -> (PluginContext, Arc<MemorySink>) {
    let logger = Arc::new(Logger::new());
    let memory = Arc::new(MemorySink::new());
    logger.add_sink(memory.clone());
    let ctx = PluginContext::new(
        logger,
        Arc::new(EventBus::new()),
        Arc::new(HostConfig::default()),
    );
    (ctx, memory)
}

fn module(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(format!("{name}{SUFFIX}"));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_walk_is_recursive_and_skips_other_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("sdr").join("drivers");
    fs::create_dir_all(&nested).unwrap();

    module(dir.path(), "gps", "");
    module(&nested, "airspy", "");
    fs::write(dir.path().join("README.md"), "docs").unwrap();

    let (ctx, memory) = context();
    let loader = FakeLoader::default();
    let registry = PluginRegistry::new();

    let loaded = scan_plugins(dir.path(), &loader, &ctx, &registry);

    assert_eq!(loaded, 2);
    assert_eq!(registry.ids(), vec!["airspy", "gps"]);
    assert_eq!(loader.loaded.lock().len(), 2);
    assert_eq!(
        memory.texts_at(LogLevel::Info)[0],
        format!("Loading plugins from {}", dir.path().display())
    );
    assert_eq!(
        memory.texts_at(LogLevel::Debug),
        vec![
            "Loaded plugins (2) : ".to_string(),
            " - airspy".to_string(),
            " - gps".to_string(),
        ]
    );
}

#[test]
fn test_duplicate_identity_keeps_second_plugin() {
    let dir = tempfile::tempdir().unwrap();
    // Walked in file name order: "a" first, "b" second.
    module(dir.path(), "a", "X");
    module(dir.path(), "b", "X");

    let (ctx, _memory) = context();
    let loader = FakeLoader::default();
    let registry = PluginRegistry::new();

    assert_eq!(scan_plugins(dir.path(), &loader, &ctx, &registry), 2);
    assert_eq!(registry.len(), 1);

    let loaded = loader.loaded.lock().clone();
    assert!(loaded[0].0.ends_with(format!("a{SUFFIX}")));
    assert!(loaded[1].0.ends_with(format!("b{SUFFIX}")));
    assert_eq!(registry.ids(), vec!["X"]);

    let kept = registry.get("X").unwrap();
    assert!(Arc::ptr_eq(&kept, &loaded[1].1));
    assert!(!Arc::ptr_eq(&kept, &loaded[0].1));
}

#[test]
fn test_load_failure_is_logged_and_scan_continues() {
    let dir = tempfile::tempdir().unwrap();
    module(dir.path(), "broken", "");
    module(dir.path(), "gps", "");

    let (ctx, memory) = context();
    let registry = PluginRegistry::new();

    assert_eq!(
        scan_plugins(dir.path(), &FakeLoader::default(), &ctx, &registry),
        1
    );
    assert_eq!(registry.ids(), vec!["gps"]);

    let errors = memory.texts_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("registered no plugin"));
}

#[test]
fn test_missing_directory_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, memory) = context();
    let registry = PluginRegistry::new();

    let loaded = scan_plugins(
        &dir.path().join("nowhere"),
        &FakeLoader::default(),
        &ctx,
        &registry,
    );

    assert_eq!(loaded, 0);
    assert_eq!(memory.texts_at(LogLevel::Critical).len(), 1);
    assert!(memory.texts_at(LogLevel::Debug).is_empty());
}

#[cfg(unix)]
#[test]
fn test_non_regular_candidate_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dangling = dir.path().join(format!("dangling{SUFFIX}"));
    std::os::unix::fs::symlink(dir.path().join("gone"), &dangling).unwrap();
    module(dir.path(), "good", "");

    let (ctx, memory) = context();
    let loader = FakeLoader::default();
    let registry = PluginRegistry::new();

    assert_eq!(scan_plugins(dir.path(), &loader, &ctx, &registry), 1);
    assert_eq!(registry.ids(), vec!["good"]);
    assert_eq!(loader.loaded.lock().len(), 1);
    assert_eq!(
        memory.texts_at(LogLevel::Error),
        vec![format!("File {} is not a valid plugin!", dangling.display())]
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_skipped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    module(elsewhere.path(), "outside", "");
    std::os::unix::fs::symlink(elsewhere.path(), dir.path().join(format!("linked{SUFFIX}")))
        .unwrap();
    std::os::unix::fs::symlink(elsewhere.path(), dir.path().join("plain")).unwrap();
    module(dir.path(), "gps", "");

    let (ctx, memory) = context();
    let loader = FakeLoader::default();
    let registry = PluginRegistry::new();

    assert_eq!(scan_plugins(dir.path(), &loader, &ctx, &registry), 1);
    assert_eq!(registry.ids(), vec!["gps"]);
    assert_eq!(loader.loaded.lock().len(), 1);
    assert!(memory.texts_at(LogLevel::Error).is_empty());
    assert!(memory.texts_at(LogLevel::Critical).is_empty());
}
