//! Registry of loaded plugins keyed by identity.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::plugin::SharedPlugin;

/// Identity -> plugin map. Iteration follows the sorted identity order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<BTreeMap<String, SharedPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `plugin` under its identity, returning the plugin it replaced.
    pub fn insert(&self, plugin: SharedPlugin) -> Option<SharedPlugin> {
        let id = plugin.id();
        self.plugins.write().insert(id, plugin)
    }

    /// Get a plugin by identity.
    pub fn get(&self, id: &str) -> Option<SharedPlugin> {
        self.plugins.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.plugins.read().contains_key(id)
    }

    /// Registered identities, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.plugins.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    /// Snapshot of all entries in identity order.
    pub fn iter(&self) -> Vec<(String, SharedPlugin)> {
        self.plugins
            .read()
            .iter()
            .map(|(id, plugin)| (id.clone(), plugin.clone()))
            .collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.ids())
            .finish()
    }
}
