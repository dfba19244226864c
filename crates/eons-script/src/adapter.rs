//! Adapter from the plug-in contract onto a script engine

use crate::{ScriptEngine, ScriptEngineFactory, ScriptError, ScriptResult, ScriptValue};
use eons_bundle::PluginIdentifier;
use eons_core::{
    Image, Plugin, PluginContext, PluginError, PluginResult, PluginType, ResourceLocator,
};
use parking_lot::{ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Global name the current context is bound to before script calls.
pub const CONTEXT_BINDING: &str = "PluginContext";

#[derive(Debug, Clone)]
struct ScriptInfo {
    name: String,
    description: String,
    version: f64,
    plugin_type: PluginType,
}

impl ScriptInfo {
    fn defaults(identifier: &PluginIdentifier) -> Self {
        Self {
            name: identifier.simple_name().to_string(),
            description: String::new(),
            version: 1.0,
            plugin_type: PluginType::Activated,
        }
    }
}

/// A plug-in implemented by a script.
///
/// Each instance owns its own engine, so restarting a scripted plug-in
/// evaluates the script again in a fresh scope. Calls into the engine are
/// serialized; a script that calls back into its own adapter while a call
/// is running gets [`ScriptError::Busy`] and the query falls back to its
/// default.
pub struct ScriptedPlugin {
    identifier: PluginIdentifier,
    source: String,
    engine: ReentrantMutex<RefCell<Box<dyn ScriptEngine>>>,
    info: RwLock<ScriptInfo>,
    resources: Option<Arc<dyn ResourceLocator>>,
}

impl ScriptedPlugin {
    pub fn new(
        identifier: PluginIdentifier,
        source: impl Into<String>,
        engine: Box<dyn ScriptEngine>,
    ) -> Self {
        let info = ScriptInfo::defaults(&identifier);
        Self {
            identifier,
            source: source.into(),
            engine: ReentrantMutex::new(RefCell::new(engine)),
            info: RwLock::new(info),
            resources: None,
        }
    }

    /// Create the plug-in with a new engine from `factory`.
    pub fn from_factory(
        identifier: PluginIdentifier,
        source: impl Into<String>,
        factory: &dyn ScriptEngineFactory,
    ) -> ScriptResult<Self> {
        Ok(Self::new(identifier, source, factory.create()?))
    }

    /// Resolve `getRepresentativeImage()` urls through `resources`.
    #[must_use]
    pub fn with_resources(mut self, resources: Arc<dyn ResourceLocator>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn identifier(&self) -> &PluginIdentifier {
        &self.identifier
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn with_engine<R>(
        &self,
        f: impl FnOnce(&mut dyn ScriptEngine) -> ScriptResult<R>,
    ) -> ScriptResult<R> {
        let guard = self.engine.lock();
        let mut engine = guard.try_borrow_mut().map_err(|_| ScriptError::Busy)?;
        f(&mut **engine)
    }

    /// Call a function if the script defines it.
    fn call_optional(&self, function: &str) -> ScriptResult<Option<ScriptValue>> {
        match self.with_engine(|engine| engine.call(function, &[])) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_missing_function() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn bind_context(&self, ctx: &PluginContext) -> ScriptResult<()> {
        self.with_engine(|engine| engine.bind(CONTEXT_BINDING, ctx.clone().into()))
    }

    fn query_bool(&self, function: &str, default: bool) -> bool {
        match self.call_optional(function) {
            Ok(Some(ScriptValue::Bool(value))) => value,
            Ok(Some(value)) if value.is_nullish() => default,
            Ok(None) => default,
            Ok(Some(value)) => {
                self.warn_type(function, "boolean", &value);
                default
            }
            Err(e) => {
                warn!(
                    script = %self.identifier.decorated(),
                    function,
                    error = %e,
                    "Script query failed"
                );
                default
            }
        }
    }

    fn warn_type(&self, function: &str, expected: &str, value: &ScriptValue) {
        warn!(
            script = %self.identifier.decorated(),
            function,
            expected,
            actual = value.type_name(),
            "Script function returned the wrong type; using the default"
        );
    }

    /// Read the metadata functions. Returns `None` when the plug-in type
    /// is out of range.
    fn harvest_info(&self) -> ScriptResult<Option<ScriptInfo>> {
        let mut info = ScriptInfo::defaults(&self.identifier);

        if let Some(value) = self.call_optional("getVersion")? {
            match value.as_number() {
                Some(version) => info.version = version,
                None if value.is_nullish() => {}
                None => self.warn_type("getVersion", "number", &value),
            }
        }

        if let Some(value) = self.call_optional("getName")? {
            match value.as_str() {
                Some(name) => info.name = name.to_string(),
                None if value.is_nullish() => {}
                None => self.warn_type("getName", "string", &value),
            }
        }

        if let Some(value) = self.call_optional("getDescription")? {
            match value.as_str() {
                Some(description) => info.description = description.to_string(),
                None if value.is_nullish() => {}
                None => self.warn_type("getDescription", "string", &value),
            }
        }

        if let Some(value) = self.call_optional("getPluginType")? {
            match value.as_number() {
                Some(code) => {
                    let plugin_type = (code.fract() == 0.0)
                        .then(|| PluginType::from_code(code as i64))
                        .flatten();
                    match plugin_type {
                        Some(plugin_type) => info.plugin_type = plugin_type,
                        None => {
                            warn!(
                                script = %self.identifier.decorated(),
                                code,
                                "getPluginType() returned an unknown plug-in type"
                            );
                            return Ok(None);
                        }
                    }
                }
                None if value.is_nullish() => {}
                None => self.warn_type("getPluginType", "number", &value),
            }
        }

        Ok(Some(info))
    }
}

impl Plugin for ScriptedPlugin {
    fn initialize(&self, ctx: &PluginContext) -> PluginResult<bool> {
        let script = self.identifier.decorated();
        let failed = |e: ScriptError| PluginError::InitializationFailed(format!("{script}: {e}"));

        self.bind_context(ctx).map_err(failed)?;
        self.with_engine(|engine| engine.evaluate(&self.source, script))
            .map_err(failed)?;

        if let Some(value) = self.call_optional("initialize").map_err(failed)? {
            match value {
                ScriptValue::Bool(false) => {
                    info!(script, "Script initialize() returned false");
                    return Ok(false);
                }
                ScriptValue::Bool(true) => {}
                value if value.is_nullish() => {}
                value => self.warn_type("initialize", "boolean", &value),
            }
        }

        let Some(info) = self.harvest_info().map_err(failed)? else {
            return Ok(false);
        };
        debug!(script, name = %info.name, plugin_type = %info.plugin_type, "Initialized script");
        *self.info.write() = info;
        Ok(true)
    }

    fn unload(&self) -> PluginResult<()> {
        match self.call_optional("unload") {
            Ok(_) => Ok(()),
            Err(e) => Err(PluginError::UnloadFailed(format!(
                "{}: {e}",
                self.identifier.decorated()
            ))),
        }
    }

    fn name(&self) -> String {
        self.info.read().name.clone()
    }

    fn description(&self) -> String {
        self.info.read().description.clone()
    }

    fn version(&self) -> f64 {
        self.info.read().version
    }

    fn plugin_type(&self) -> PluginType {
        self.info.read().plugin_type
    }

    /// Showing calls `run()`. Hiding calls nothing in the script.
    fn show(&self, ctx: &PluginContext, show: bool) -> PluginResult<()> {
        if !show {
            return Ok(());
        }

        let shown = self
            .bind_context(ctx)
            .and_then(|()| self.call_optional("run"));
        match shown {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                debug!(script = %self.identifier.decorated(), "Script has no run() function");
                Ok(())
            }
            Err(e) => Err(PluginError::ShowFailed(format!(
                "{}: {e}",
                self.identifier.decorated()
            ))),
        }
    }

    fn is_showing(&self) -> bool {
        self.query_bool("isPluginShowing", false)
    }

    fn is_usable(&self) -> bool {
        self.query_bool("isPluginUsable", true)
    }

    fn default_accelerator_key(&self) -> Option<String> {
        match self.call_optional("getDefaultAcceleratorKey") {
            Ok(Some(ScriptValue::String(key))) if !key.trim().is_empty() => Some(key),
            Ok(Some(value)) if !value.is_nullish() && value.as_str().is_none() => {
                self.warn_type("getDefaultAcceleratorKey", "string", &value);
                None
            }
            Ok(_) => None,
            Err(e) => {
                warn!(script = %self.identifier.decorated(), error = %e, "Script query failed");
                None
            }
        }
    }

    fn representative_image(&self) -> Option<Image> {
        let url = match self.call_optional("getRepresentativeImage") {
            Ok(Some(ScriptValue::String(url))) => url,
            Ok(Some(value)) if !value.is_nullish() => {
                self.warn_type("getRepresentativeImage", "string", &value);
                return None;
            }
            Ok(_) => return None,
            Err(e) => {
                warn!(script = %self.identifier.decorated(), error = %e, "Script query failed");
                return None;
            }
        };

        let resources = self.resources.as_ref()?;
        match Image::load(resources.as_ref(), &url) {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    script = %self.identifier.decorated(),
                    %url,
                    error = %e,
                    "Cannot load plug-in image"
                );
                None
            }
        }
    }
}

impl fmt::Debug for ScriptedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedPlugin")
            .field("identifier", &self.identifier.to_string())
            .field("info", &*self.info.read())
            .finish()
    }
}
