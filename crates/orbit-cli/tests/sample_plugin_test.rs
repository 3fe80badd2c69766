//! CLI tests against a real plugin module built from `orbit-sample-plugin`.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use assert_cmd::Command;
use predicates::prelude::*;

fn orbit(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("orbit").unwrap();
    cmd.current_dir(cwd)
        .env_remove("ORBIT_LOG_LEVEL")
        .env_remove("ORBIT_CONSOLE_LEVEL")
        .env_remove("ORBIT_FILE_LEVEL")
        .env_remove("ORBIT_LOG_FILE")
        .env_remove("ORBIT_RESOURCES_PATH")
        .env("ORBIT_CONSOLE", "ansi");
    cmd
}

fn module_name() -> String {
    format!("{DLL_PREFIX}orbit_sample_plugin{DLL_SUFFIX}")
}

/// Build the heartbeat module once, in its own target directory so the outer
/// cargo lock is never contended.
fn sample_module() -> &'static Path {
    static MODULE: OnceLock<PathBuf> = OnceLock::new();
    MODULE.get_or_init(|| {
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("sample-plugin");
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../Cargo.toml");

        let status = std::process::Command::new(option_env!("CARGO").unwrap_or("cargo"))
            .args(["build", "-p", "orbit-sample-plugin", "--manifest-path"])
            .arg(&manifest)
            .env("CARGO_TARGET_DIR", &target_dir)
            .status()
            .unwrap();
        assert!(status.success(), "building orbit-sample-plugin failed");

        let module = target_dir.join("debug").join(module_name());
        assert!(module.is_file(), "{} was not produced", module.display());
        module
    })
}

fn install(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(module_name());
    std::fs::copy(sample_module(), &path).unwrap();
    path
}

#[test]
fn test_plugins_lists_heartbeat() {
    let cwd = tempfile::tempdir().unwrap();
    install(&cwd.path().join("plugins"));

    orbit(cwd.path())
        .arg("plugins")
        .assert()
        .success()
        .stdout("heartbeat\n")
        .stderr(predicate::str::contains("(I) Heartbeat plugin ready"));
}

#[test]
fn test_inspect_prints_heartbeat() {
    let cwd = tempfile::tempdir().unwrap();
    let module = install(cwd.path());

    orbit(cwd.path())
        .arg("inspect")
        .arg(&module)
        .assert()
        .success()
        .stdout("heartbeat\n");
}

#[test]
fn test_run_delivers_host_started_to_heartbeat() {
    let cwd = tempfile::tempdir().unwrap();
    install(&cwd.path().join("plugins"));

    orbit(cwd.path())
        .arg("run")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Heartbeat 1 after host.started from host",
        ))
        .stderr(predicate::str::contains(
            "Orbit started with 1 plugin(s), 1 handler(s) notified",
        ));
}

#[test]
fn test_plugin_init_finishes_before_next_module_loads() {
    let cwd = tempfile::tempdir().unwrap();
    let plugins = cwd.path().join("plugins");
    install(&plugins.join("a"));
    install(&plugins.join("nested").join("b"));

    let output = orbit(cwd.path()).arg("plugins").output().unwrap();
    assert!(output.status.success());
    // Same identity twice: the second copy replaces the first in the registry.
    assert_eq!(String::from_utf8_lossy(&output.stdout), "heartbeat\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let position = |needle: &str| {
        stderr
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} missing from:\n{stderr}"))
    };

    // The walk starts from the canonical working directory, so match on the tail only.
    let first = Path::new("a").join(module_name());
    let second = Path::new("b").join(module_name());

    let loading_first = position(&format!("{}...", first.display()));
    let ready = position("Heartbeat plugin ready");
    let loaded = position("Plugin heartbeat loaded!");
    let loading_second = position(&format!("{}...", second.display()));

    assert!(loading_first < ready);
    assert!(ready < loaded);
    assert!(loaded < loading_second);
}
