//! Command-line host for Orbit plugins.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orbit_core::log::{ConsoleKind, LogLevel, LoggerLayer};
use orbit_core::plugin::{load_plugin, PluginError};
use orbit_core::{Event, HostConfig, HostContext};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Orbit - load native plugins and wire them to a shared logger and event bus.
#[derive(Parser, Debug)]
#[command(name = "orbit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform (defaults to `run`).
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resources directory; its `plugins` subdirectory is used when `./plugins` is missing.
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    /// Logger threshold (trace, debug, info, warn, error, critical).
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Console threshold.
    #[arg(long, global = true)]
    console_level: Option<LogLevel>,

    /// Console kind (auto, ansi, attributes, syslog).
    #[arg(long, global = true)]
    console: Option<String>,

    /// Also write `orbit.logs` in the working directory.
    #[arg(long, global = true)]
    log_file: bool,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Load every plugin and announce the host as started.
    Run,
    /// Load a single plugin module and print its identity.
    Inspect {
        /// Path to the plugin module.
        path: PathBuf,
    },
    /// Load every plugin and list their identities.
    Plugins,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    let host = HostContext::new(config).context("Failed to initialize host")?;
    install_tracing(&host);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&host),
        Command::Inspect { path } => inspect(&host, &path),
        Command::Plugins => list_plugins(&host),
    }
}

/// Defaults, then the config file, then `ORBIT_*` variables, then flags.
fn build_config(args: &Args) -> Result<HostConfig> {
    let config = match &args.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HostConfig::default(),
    };
    let mut config = config.with_env()?;

    if let Some(resources) = &args.resources {
        config.resources_path = resources.clone();
    }
    if let Some(level) = args.log_level {
        config.logger_level = level;
    }
    if let Some(level) = args.console_level {
        config.console_level = level;
    }
    if let Some(kind) = &args.console {
        config.console = kind.parse::<ConsoleKind>()?;
    }
    if args.log_file {
        config.file_logging = true;
    }
    Ok(config)
}

/// Route `tracing` events through the host logger.
fn install_tracing(host: &HostContext) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(LoggerLayer::new(host.logger().clone()))
        .try_init();
}

fn run(host: &HostContext) -> Result<()> {
    host.load_plugins();
    let ids = host.plugins().ids();

    let delivered = host
        .event_bus()
        .publish(&Event::new("host.started", json!({ "plugins": ids })));
    tracing::info!(
        "Orbit started with {} plugin(s), {} handler(s) notified",
        ids.len(),
        delivered
    );
    Ok(())
}

fn inspect(host: &HostContext, path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PluginError::NotAFile(path.to_path_buf()).into());
    }
    let plugin = load_plugin(path, &host.plugin_context())?;
    println!("{}", plugin.id());
    Ok(())
}

fn list_plugins(host: &HostContext) -> Result<()> {
    host.load_plugins();
    for id in host.plugins().ids() {
        println!("{id}");
    }
    Ok(())
}
