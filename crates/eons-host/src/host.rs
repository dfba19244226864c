//! Host orchestration: discovery, boot order and shutdown

use crate::{
    BundleResources, DiscoveryReport, HostConfig, HostResult, InstalledBundleObject,
    LifecycleError, PluginRegistry, PluginServices, discover,
};
use eons_bundle::{BundleKind, PluginIdentifier};
use eons_core::{ActivationModifiers, FailureTracker, PluginType, Settings};
use eons_script::{CONTEXT_BINDING, ScriptError, ScriptValue};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name given to ad hoc scripts in error messages
const AD_HOC_SCRIPT: &str = "<script>";

/// Owns the installed objects of one application session.
///
/// ```no_run
/// use eons_host::{HostConfig, PluginHost};
///
/// let config = HostConfig::new().with_plugin_dir("plugins");
/// let host = PluginHost::new(config)?;
/// host.discover()?;
/// for err in host.start_extensions() {
///     eprintln!("{err}");
/// }
/// host.load_plugins();
/// // ... run the application ...
/// host.unload_all();
/// # Ok::<(), eons_host::HostError>(())
/// ```
pub struct PluginHost {
    config: HostConfig,
    services: Arc<PluginServices>,
    resources: Arc<BundleResources>,
    objects: RwLock<Vec<Arc<InstalledBundleObject>>>,
}

impl PluginHost {
    /// Create a host, loading settings from the configured settings file.
    pub fn new(config: HostConfig) -> HostResult<Self> {
        let settings = match &config.settings_file {
            Some(path) => Settings::load_json(path)?,
            None => Settings::new(),
        };
        Ok(Self::with_settings(config, Arc::new(settings)))
    }

    /// Create a host around an existing settings store.
    pub fn with_settings(config: HostConfig, settings: Arc<Settings>) -> Self {
        let services = Arc::new(PluginServices::new(
            settings,
            Arc::new(FailureTracker::new()),
            config.locale(),
        ));
        let resources = Arc::new(BundleResources::new());
        services.registry().set_resources(resources.clone());
        Self {
            config,
            services,
            resources,
            objects: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn services(&self) -> &Arc<PluginServices> {
        &self.services
    }

    /// Registry for native plug-ins and the script engine
    pub fn registry(&self) -> &PluginRegistry {
        self.services.registry()
    }

    pub fn failures(&self) -> &Arc<FailureTracker> {
        self.services.failures()
    }

    pub fn settings(&self) -> &Arc<Settings> {
        self.services.settings()
    }

    /// Scan the configured directories and replace the installed objects.
    ///
    /// Discovered bundles are added to the resource search path, so scripts
    /// and images in any bundle can be found.
    pub fn discover(&self) -> HostResult<DiscoveryReport> {
        let report = discover(&self.config.plugin_dirs, &self.services);
        for bundle in &report.bundles {
            self.resources.add_bundle(bundle.path())?;
        }
        *self.objects.write() = report.objects.clone();
        Ok(report)
    }

    /// Installed objects in install order
    pub fn objects(&self) -> Vec<Arc<InstalledBundleObject>> {
        self.objects.read().clone()
    }

    pub fn objects_of_kind(&self, kind: BundleKind) -> Vec<Arc<InstalledBundleObject>> {
        self.objects
            .read()
            .iter()
            .filter(|object| object.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn find(&self, identifier: &PluginIdentifier) -> Option<Arc<InstalledBundleObject>> {
        self.objects
            .read()
            .iter()
            .find(|object| object.identifier() == Some(identifier))
            .cloned()
    }

    /// Start every extension once, in install order.
    ///
    /// Extensions from bundles that failed before are skipped. Returns the
    /// errors of the extensions that failed to start.
    pub fn start_extensions(&self) -> Vec<LifecycleError> {
        let mut errors = Vec::new();
        for object in self.objects_of_kind(BundleKind::Extension) {
            if self.is_known_bad(&object) {
                info!(
                    identifier = %object.label(),
                    "Skipping extension from a bundle that failed before"
                );
                continue;
            }
            if let Err(e) = object.start(ActivationModifiers::NONE) {
                errors.push(e);
            }
        }
        errors
    }

    /// Read every plug-in's metadata and start the injected ones.
    ///
    /// Returns the errors of the injected plug-ins that failed to start.
    /// Plug-ins whose probe failed are listed with degraded metadata.
    pub fn load_plugins(&self) -> Vec<LifecycleError> {
        let mut errors = Vec::new();
        for object in self.objects_of_kind(BundleKind::Plugin) {
            let Some(info) = object.plugin_info() else {
                continue;
            };
            if info.degraded || info.plugin_type != PluginType::Injected {
                continue;
            }
            if let Err(e) = object.start(ActivationModifiers::NONE) {
                errors.push(e);
            }
        }
        // probing can finish resolving names, which changes the order
        crate::installed::sort_objects(&mut self.objects.write());
        errors
    }

    /// Run the configured boot sequence: discovery, extensions, plug-ins.
    pub fn boot(&self) -> HostResult<(DiscoveryReport, Vec<LifecycleError>)> {
        let report = self.discover()?;
        let mut errors = Vec::new();
        if self.config.auto_start_extensions {
            errors.extend(self.start_extensions());
        }
        if self.config.load_plugins {
            errors.extend(self.load_plugins());
        }
        Ok((report, errors))
    }

    /// Stop every running plug-in, in reverse install order.
    pub fn unload_all(&self) -> Vec<LifecycleError> {
        let mut errors = Vec::new();
        for object in self.objects().iter().rev().filter(|o| o.is_started()) {
            debug!(identifier = %object.label(), "Unloading plug-in");
            if let Err(e) = object.stop() {
                errors.push(e);
            }
        }
        errors
    }

    /// Evaluate script text outside any installed bundle.
    ///
    /// The script sees a dummy context bound as `PluginContext`; its
    /// settings live in the shared ad hoc namespace.
    pub fn run_script(
        &self,
        source: &str,
        modifiers: ActivationModifiers,
    ) -> HostResult<ScriptValue> {
        let factory = self.registry().script_engine().ok_or_else(|| {
            ScriptError::Unavailable("no script engine is registered".to_string())
        })?;
        let mut engine = factory.create()?;
        let ctx = self.services.contexts().create_dummy(modifiers);
        engine.bind(CONTEXT_BINDING, ctx.into())?;
        Ok(engine.evaluate(source, AD_HOC_SCRIPT)?)
    }

    /// Write settings to the configured settings file, if there is one.
    pub fn save_settings(&self) -> HostResult<()> {
        if let Some(path) = &self.config.settings_file {
            self.settings().save_json(path)?;
        }
        Ok(())
    }

    fn is_known_bad(&self, object: &InstalledBundleObject) -> bool {
        object
            .catalog_id()
            .is_some_and(|catalog| self.failures().is_failed(&catalog.uuid()))
    }
}

impl Drop for PluginHost {
    fn drop(&mut self) {
        let running = self.objects.read().iter().filter(|o| o.is_started()).count();
        if running > 0 {
            warn!(running, "Plug-in host dropped with plug-ins still running");
        }
    }
}
