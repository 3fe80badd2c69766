//! Host context: the services built once at startup and handed to every subsystem.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{defaults, HostConfig};
use crate::error::Result;
use crate::eventbus::{EventBus, SharedEventBus};
use crate::log::{console_sink, DynSink, FileSink, LogLevel, Logger, Sink};
use crate::plugin::{self, PluginContext, PluginRegistry};

/// Everything the host owns: configuration, logger and its sinks, event bus and the
/// plugin registry.
///
/// Dropping the context flushes and closes the sinks. Plugin modules stay mapped.
pub struct HostContext {
    config: Arc<HostConfig>,
    logger: Arc<Logger>,
    console: DynSink,
    file: Mutex<Option<Arc<FileSink>>>,
    event_bus: SharedEventBus,
    plugins: PluginRegistry,
}

impl HostContext {
    /// Build the host with the console sink selected for the running platform.
    pub fn new(config: HostConfig) -> Result<Self> {
        let console = console_sink(config.console);
        Self::with_console(config, console)
    }

    /// Build the host around an explicit console sink.
    ///
    /// The console sink is always the first sink; the file sink, when enabled by the
    /// configuration, follows it.
    pub fn with_console(config: HostConfig, console: DynSink) -> Result<Self> {
        let logger = Arc::new(Logger::with_level(config.logger_level));
        console.set_level(config.console_level);
        logger.add_sink(console.clone());

        let file_logging = config.file_logging;
        let host = Self {
            config: Arc::new(config),
            logger,
            console,
            file: Mutex::new(None),
            event_bus: Arc::new(EventBus::new()),
            plugins: PluginRegistry::new(),
        };

        if file_logging {
            host.enable_file_sink()?;
        }
        Ok(host)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn event_bus(&self) -> &SharedEventBus {
        &self.event_bus
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn console_sink(&self) -> &DynSink {
        &self.console
    }

    /// The file sink, if enabled.
    pub fn file_sink(&self) -> Option<Arc<FileSink>> {
        self.file.lock().clone()
    }

    /// Add the file sink writing `orbit.logs` in the working directory.
    pub fn enable_file_sink(&self) -> Result<Arc<FileSink>> {
        self.enable_file_sink_at(defaults::LOG_FILE_NAME)
    }

    /// Add a file sink writing `path`, at the configured file threshold.
    ///
    /// Only one file sink is ever added; later calls return the existing one.
    pub fn enable_file_sink_at(&self, path: impl AsRef<Path>) -> Result<Arc<FileSink>> {
        let mut slot = self.file.lock();
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }

        let sink = Arc::new(FileSink::create(path)?);
        sink.set_level(self.config.file_level);
        self.logger.add_sink(sink.clone());
        *slot = Some(sink.clone());
        Ok(sink)
    }

    /// Change the console threshold only; the logger threshold is untouched.
    pub fn set_console_level(&self, level: LogLevel) {
        self.console.set_level(level);
    }

    /// What plugins get to see during `init`.
    pub fn plugin_context(&self) -> PluginContext {
        PluginContext::new(
            self.logger.clone(),
            self.event_bus.clone(),
            self.config.clone(),
        )
    }

    /// Discover and load plugins into the registry. Returns the number loaded.
    pub fn load_plugins(&self) -> usize {
        plugin::load_plugins(self)
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("config", &self.config)
            .field("logger", &self.logger)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}
