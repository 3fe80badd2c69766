//! Orbit Plugin SDK
//!
//! Everything a plugin crate needs: the [`Plugin`] trait, the context it receives at
//! `init` time and the [`export_plugin!`] macro producing the `loader` declaration the
//! host looks for.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use orbit_plugin_sdk::prelude::*;
//!
//! #[derive(Default)]
//! struct Gps;
//!
//! impl Plugin for Gps {
//!     fn id(&self) -> String {
//!         "gps".to_string()
//!     }
//!
//!     fn init(&mut self, ctx: &PluginContext) {
//!         ctx.logger.info("GPS plugin ready");
//!     }
//! }
//!
//! export_plugin!(Gps);
//! ```
//!
//! Build the crate as a `cdylib` and drop the library into a `plugins` directory.

#[macro_use]
pub mod macros;

pub use orbit_core;
pub use orbit_core::plugin::{PLUGIN_ABI_VERSION, LOADER_SYMBOL};
pub use orbit_core::{
    Event, EventBus, EventMetadata, Plugin, PluginContext, PluginDeclaration, PluginRegistrar,
    SharedEventBus, CORE_VERSION,
};

/// Prelude module with common imports
pub mod prelude {
    pub use orbit_core::eventbus::WILDCARD;
    pub use orbit_core::log::{LogLevel, Logger};
    pub use orbit_core::{Event, EventMetadata, Plugin, PluginContext, PluginRegistrar};
    pub use serde_json::{json, Value};

    pub use crate::export_plugin;
}
