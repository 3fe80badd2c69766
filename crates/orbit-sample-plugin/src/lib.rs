//! Heartbeat plugin.
//!
//! Answers every `host.started` event with a `heartbeat.alive` event carrying the
//! number of beats sent so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use orbit_plugin_sdk::prelude::*;

/// Event kind the plugin reacts to.
pub const STARTED_EVENT: &str = "host.started";
/// Event kind the plugin publishes.
pub const ALIVE_EVENT: &str = "heartbeat.alive";

#[derive(Default)]
pub struct Heartbeat {
    beats: Arc<AtomicU64>,
}

impl Heartbeat {
    /// Beats sent so far.
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::SeqCst)
    }
}

impl Plugin for Heartbeat {
    fn id(&self) -> String {
        "heartbeat".to_string()
    }

    fn init(&mut self, ctx: &PluginContext) {
        let beats = self.beats.clone();
        let logger = ctx.logger.clone();
        let bus = Arc::downgrade(&ctx.event_bus);

        ctx.event_bus.subscribe(STARTED_EVENT, move |event| {
            let count = beats.fetch_add(1, Ordering::SeqCst) + 1;
            logger.debug(format!(
                "Heartbeat {} after {} from {}",
                count, event.kind, event.metadata.source
            ));
            if let Some(bus) = bus.upgrade() {
                bus.publish(&Event::from_source(
                    "heartbeat",
                    ALIVE_EVENT,
                    json!({ "beats": count }),
                ));
            }
        });

        ctx.logger.info("Heartbeat plugin ready");
    }
}

export_plugin!(Heartbeat);

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_plugin_sdk::orbit_core::log::MemorySink;
    use orbit_plugin_sdk::orbit_core::{EventBus, HostConfig};
    use std::sync::Mutex;

    #[test]
    fn test_heartbeat_answers_host_started() {
        let logger = Arc::new(Logger::new());
        let memory = Arc::new(MemorySink::new());
        logger.add_sink(memory.clone());
        let ctx = PluginContext::new(
            logger,
            Arc::new(EventBus::new()),
            Arc::new(HostConfig::default()),
        );

        let mut plugin = Heartbeat::default();
        plugin.init(&ctx);
        assert_eq!(memory.texts_at(LogLevel::Info), vec!["Heartbeat plugin ready".to_string()]);

        let alive = Arc::new(Mutex::new(Vec::new()));
        let sink = alive.clone();
        ctx.event_bus.subscribe(ALIVE_EVENT, move |event| {
            sink.lock().unwrap().push(event.payload.clone());
        });

        ctx.event_bus.publish(&Event::new(STARTED_EVENT, Value::Null));
        ctx.event_bus.publish(&Event::new(STARTED_EVENT, Value::Null));

        assert_eq!(plugin.beats(), 2);
        assert_eq!(
            *alive.lock().unwrap(),
            vec![json!({ "beats": 1 }), json!({ "beats": 2 })]
        );
    }

    #[test]
    fn test_exported_declaration_registers_heartbeat() {
        struct Ids(Vec<String>);

        impl PluginRegistrar for Ids {
            fn register_plugin(&mut self, plugin: Box<dyn Plugin>) {
                self.0.push(plugin.id());
            }
        }

        let mut ids = Ids(Vec::new());
        (loader.register)(&mut ids);
        assert_eq!(ids.0, vec!["heartbeat".to_string()]);
    }
}
