//! Registry that turns plug-in identifiers into instances
//!
//! Native plug-ins are registered up front as factory closures keyed by
//! their normalized type name. Scripted plug-ins need no registration:
//! their source is read through the resource locator and run by the
//! registered script engine.

use crate::{HostError, HostResult, LifecycleError};
use dashmap::DashMap;
use eons_bundle::PluginIdentifier;
use eons_core::{Plugin, ResourceLocator};
use eons_script::{ScriptEngineFactory, ScriptedPlugin};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Creates a fresh instance of a native plug-in.
pub type NativeFactory = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Maps identifiers to plug-in constructors.
#[derive(Default)]
pub struct PluginRegistry {
    natives: DashMap<String, NativeFactory>,
    engine: RwLock<Option<Arc<dyn ScriptEngineFactory>>>,
    resources: RwLock<Option<Arc<dyn ResourceLocator>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native plug-in under any spelling of its identifier.
    ///
    /// Returns the normalized identifier. A later registration under the
    /// same identifier replaces the earlier one.
    pub fn register_native<F>(&self, id: &str, factory: F) -> HostResult<PluginIdentifier>
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        let identifier = PluginIdentifier::parse(id).map_err(eons_bundle::BundleError::from)?;
        let PluginIdentifier::Native(name) = &identifier else {
            return Err(HostError::Registration {
                identifier: identifier.to_string(),
                reason: "script identifiers are loaded from resources".to_string(),
            });
        };

        if self.natives.insert(name.clone(), Arc::new(factory)).is_some() {
            debug!(identifier = %name, "Replaced native plug-in registration");
        }
        Ok(identifier)
    }

    /// Register a native plug-in type that has a `Default` constructor.
    pub fn register_type<P>(&self, id: &str) -> HostResult<PluginIdentifier>
    where
        P: Plugin + Default,
    {
        self.register_native(id, || Arc::new(P::default()) as Arc<dyn Plugin>)
    }

    /// Remove a native registration.
    pub fn unregister(&self, identifier: &PluginIdentifier) -> bool {
        match identifier {
            PluginIdentifier::Native(name) => self.natives.remove(name).is_some(),
            PluginIdentifier::Script(_) => false,
        }
    }

    /// Check if `identifier` can be instantiated without touching
    /// resources. Script identifiers only need an engine.
    pub fn is_registered(&self, identifier: &PluginIdentifier) -> bool {
        match identifier {
            PluginIdentifier::Native(name) => self.natives.contains_key(name),
            PluginIdentifier::Script(_) => self.engine.read().is_some(),
        }
    }

    /// Normalized names of the registered native plug-ins, sorted
    pub fn native_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.natives.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn set_script_engine(&self, factory: Arc<dyn ScriptEngineFactory>) {
        *self.engine.write() = Some(factory);
    }

    pub fn script_engine(&self) -> Option<Arc<dyn ScriptEngineFactory>> {
        self.engine.read().clone()
    }

    pub fn set_resources(&self, resources: Arc<dyn ResourceLocator>) {
        *self.resources.write() = Some(resources);
    }

    pub fn resources(&self) -> Option<Arc<dyn ResourceLocator>> {
        self.resources.read().clone()
    }

    /// Create a new, uninitialized instance of a plug-in.
    pub fn instantiate(
        &self,
        identifier: &PluginIdentifier,
    ) -> Result<Arc<dyn Plugin>, LifecycleError> {
        match identifier {
            PluginIdentifier::Native(name) => {
                // clone out so the factory runs without holding the map shard
                let factory = self
                    .natives
                    .get(name)
                    .map(|entry| Arc::clone(entry.value()))
                    .ok_or_else(|| LifecycleError::NotRegistered(name.clone()))?;
                Ok(factory())
            }
            PluginIdentifier::Script(url) => self.instantiate_script(identifier, url),
        }
    }

    fn instantiate_script(
        &self,
        identifier: &PluginIdentifier,
        url: &str,
    ) -> Result<Arc<dyn Plugin>, LifecycleError> {
        let unavailable = |reason: String| LifecycleError::ScriptUnavailable {
            identifier: url.to_string(),
            reason,
        };

        let engine = self
            .script_engine()
            .ok_or_else(|| unavailable("no script engine is registered".to_string()))?;
        let resources = self
            .resources()
            .ok_or_else(|| unavailable("no resource locator is registered".to_string()))?;

        let source = resources
            .read_text(url)
            .map_err(|e| unavailable(e.to_string()))?
            .ok_or_else(|| LifecycleError::ResourceNotFound(url.to_string()))?;

        let plugin = ScriptedPlugin::from_factory(identifier.clone(), source, engine.as_ref())
            .map_err(|e| unavailable(e.to_string()))?
            .with_resources(resources);
        Ok(Arc::new(plugin))
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("natives", &self.native_names())
            .field(
                "engine",
                &self.engine.read().as_ref().map(|e| e.language().to_string()),
            )
            .field("resources", &self.resources.read().is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry/registry_tests.rs"]
mod registry_tests;
