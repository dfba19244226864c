//! Host settings and per-plug-in namespaces

use crate::{PluginError, PluginResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe string key/value settings store.
///
/// Plug-ins see it through a [`SettingsNamespace`] that prefixes every key,
/// so two plug-ins can use the same key names without colliding.
#[derive(Debug, Default)]
pub struct Settings {
    values: RwLock<BTreeMap<String, String>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Load settings from a JSON object of strings.
    ///
    /// A missing file yields empty settings.
    pub fn load_json<P: AsRef<Path>>(path: P) -> PluginResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No settings file; starting empty");
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        let values: BTreeMap<String, String> = serde_json::from_str(&text)?;
        debug!(path = %path.display(), count = values.len(), "Loaded settings");
        Ok(Self::from_map(values))
    }

    /// Write all settings as a pretty-printed JSON object.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> PluginResult<()> {
        let json = serde_json::to_string_pretty(&*self.values.read())?;
        fs::write(path.as_ref(), json).map_err(|e| {
            PluginError::SettingsError(format!("cannot write {}: {e}", path.as_ref().display()))
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    /// Set a value, returning the previous one.
    pub fn set(&self, key: &str, value: &str) -> Option<String> {
        self.values.write().insert(key.to_string(), value.to_string())
    }

    /// Set a value only if the key has none. Returns `true` if it was set.
    pub fn set_default(&self, key: &str, value: &str) -> bool {
        let mut values = self.values.write();
        if values.contains_key(key) {
            return false;
        }
        values.insert(key.to_string(), value.to_string());
        true
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.values
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// A view of this store that prefixes every key with `prefix`.
    pub fn namespace(self: &Arc<Self>, prefix: impl Into<String>) -> SettingsNamespace {
        SettingsNamespace {
            settings: Arc::clone(self),
            prefix: prefix.into(),
        }
    }
}

/// Prefixed view of a [`Settings`] store.
#[derive(Debug, Clone)]
pub struct SettingsNamespace {
    settings: Arc<Settings>,
    prefix: String,
}

impl SettingsNamespace {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full key in the underlying store.
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.settings.get(&self.key(name))
    }

    pub fn set(&self, name: &str, value: &str) -> Option<String> {
        self.settings.set(&self.key(name), value)
    }

    pub fn set_default(&self, name: &str, value: &str) -> bool {
        self.settings.set_default(&self.key(name), value)
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.settings.remove(&self.key(name))
    }

    /// Names in this namespace, without the prefix.
    pub fn names(&self) -> Vec<String> {
        self.settings
            .keys_with_prefix(&self.prefix)
            .into_iter()
            .map(|key| key[self.prefix.len()..].to_string())
            .collect()
    }

    /// The whole store
    pub fn global(&self) -> &Arc<Settings> {
        &self.settings
    }
}
