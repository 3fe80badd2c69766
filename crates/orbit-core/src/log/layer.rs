//! Bridge from `tracing` events into the [`Logger`].
//!
//! Installing [`LoggerLayer`] in a `tracing_subscriber` registry makes every
//! `tracing::info!` and friends go through the same sink chain as direct logger calls.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::log::level::LogLevel;
use crate::log::logger::Logger;

/// `tracing_subscriber` layer forwarding events to a shared [`Logger`].
#[derive(Debug, Clone)]
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    /// Layer feeding `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

/// Level used for events of the given `tracing` level.
pub fn level_from_tracing(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = level_from_tracing(event.metadata().level());
        if level < self.logger.level() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logger.log(level, visitor.message + &visitor.fields);
    }
}
