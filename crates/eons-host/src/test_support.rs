//! Plug-ins and a script engine for tests

use crate::PluginServices;
use eons_bundle::{BundleKind, CatalogId, PluginIdentifier};
use eons_core::{
    InstalledObject, Plugin, PluginContext, PluginError, PluginResult, PluginType,
};
use eons_script::{ScriptEngine, ScriptEngineFactory, ScriptError, ScriptResult, ScriptValue};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared, ordered record of plug-in callbacks.
#[derive(Debug, Clone, Default)]
pub(crate) struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub(crate) fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == event).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum InitOutcome {
    #[default]
    Succeed,
    ReturnFalse,
    Error,
    Panic,
}

type InitHook = Arc<dyn Fn(&PluginContext) + Send + Sync>;

/// Recipe for [`TestPlugin`] instances.
#[derive(Clone, Default)]
pub(crate) struct TestPluginSpec {
    pub(crate) name: String,
    pub(crate) plugin_type: PluginType,
    pub(crate) init: InitOutcome,
    pub(crate) unload_fails: bool,
    pub(crate) hide_fails: bool,
    pub(crate) showing_panics: bool,
    pub(crate) on_init: Option<InitHook>,
}

impl TestPluginSpec {
    pub(crate) fn new(name: &str, plugin_type: PluginType) -> Self {
        Self {
            name: name.to_string(),
            plugin_type,
            ..Self::default()
        }
    }

    pub(crate) fn init(mut self, init: InitOutcome) -> Self {
        self.init = init;
        self
    }

    pub(crate) fn unload_fails(mut self) -> Self {
        self.unload_fails = true;
        self
    }

    pub(crate) fn hide_fails(mut self) -> Self {
        self.hide_fails = true;
        self
    }

    pub(crate) fn showing_panics(mut self) -> Self {
        self.showing_panics = true;
        self
    }

    pub(crate) fn on_init(mut self, hook: impl Fn(&PluginContext) + Send + Sync + 'static) -> Self {
        self.on_init = Some(Arc::new(hook));
        self
    }

    /// Register this recipe as a native plug-in. Returns the number of
    /// instances created so far.
    pub(crate) fn register(
        self,
        services: &PluginServices,
        id: &str,
        events: &Events,
    ) -> Arc<AtomicUsize> {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let events = events.clone();
        services
            .registry()
            .register_native(id, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(TestPlugin {
                    spec: self.clone(),
                    events: events.clone(),
                    showing: AtomicBool::new(false),
                }) as Arc<dyn Plugin>
            })
            .unwrap();
        created
    }
}

/// Native plug-in that records its callbacks.
pub(crate) struct TestPlugin {
    spec: TestPluginSpec,
    events: Events,
    showing: AtomicBool,
}

impl Plugin for TestPlugin {
    fn initialize(&self, ctx: &PluginContext) -> PluginResult<bool> {
        let probe = if ctx.is_information_probe() { ":probe" } else { "" };
        self.events.push(format!("init:{}{probe}", self.spec.name));
        if let Some(hook) = &self.spec.on_init {
            hook(ctx);
        }
        match self.spec.init {
            InitOutcome::Succeed => Ok(true),
            InitOutcome::ReturnFalse => Ok(false),
            InitOutcome::Error => Err(PluginError::InitializationFailed("no deck".to_string())),
            InitOutcome::Panic => panic!("init exploded"),
        }
    }

    fn unload(&self) -> PluginResult<()> {
        self.events.push(format!("unload:{}", self.spec.name));
        if self.spec.unload_fails {
            return Err(PluginError::UnloadFailed("still in use".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.spec.name.clone()
    }

    fn description(&self) -> String {
        format!("{} for tests", self.spec.name)
    }

    fn version(&self) -> f64 {
        2.5
    }

    fn plugin_type(&self) -> PluginType {
        self.spec.plugin_type
    }

    fn show(&self, _ctx: &PluginContext, show: bool) -> PluginResult<()> {
        self.events.push(format!("show:{}:{show}", self.spec.name));
        if !show && self.spec.hide_fails {
            return Err(PluginError::ShowFailed("window stuck".to_string()));
        }
        self.showing.store(show, Ordering::SeqCst);
        Ok(())
    }

    fn is_showing(&self) -> bool {
        if self.spec.showing_panics {
            panic!("showing state lost");
        }
        self.showing.load(Ordering::SeqCst)
    }

    fn default_accelerator_key(&self) -> Option<String> {
        Some("ctrl T".to_string())
    }
}

/// Installed object stand-in for lifecycle tests.
pub(crate) struct StubOwner {
    pub(crate) kind: BundleKind,
    pub(crate) identifier: PluginIdentifier,
    pub(crate) catalog_id: Option<CatalogId>,
}

impl InstalledObject for StubOwner {
    fn kind(&self) -> BundleKind {
        self.kind
    }

    fn catalog_id(&self) -> Option<CatalogId> {
        self.catalog_id
    }

    fn identifier(&self) -> Option<PluginIdentifier> {
        Some(self.identifier.clone())
    }

    fn name(&self) -> String {
        self.identifier.simple_name().to_string()
    }
}

/// Engine for a tiny line language: `function = value`.
///
/// Values are `true`, `false`, `null`, numbers, `!message` (raises a
/// runtime error) or text. A first line of `!syntax` fails evaluation.
#[derive(Debug, Default)]
pub(crate) struct TableEngine {
    functions: HashMap<String, String>,
    bindings: HashMap<String, ScriptValue>,
}

impl ScriptEngine for TableEngine {
    fn evaluate(&mut self, source: &str, name: &str) -> ScriptResult<ScriptValue> {
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line == "!syntax" {
                return Err(ScriptError::Syntax {
                    script: name.to_string(),
                    message: "unexpected token".to_string(),
                });
            }
            if let Some((function, value)) = line.split_once('=') {
                self.functions
                    .insert(function.trim().to_string(), value.trim().to_string());
            }
        }
        Ok(ScriptValue::Undefined)
    }

    fn call(&mut self, function: &str, _args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        let value = self
            .functions
            .get(function)
            .ok_or_else(|| ScriptError::NoSuchFunction(function.to_string()))?;
        Ok(match value.as_str() {
            "true" => ScriptValue::Bool(true),
            "false" => ScriptValue::Bool(false),
            "null" => ScriptValue::Null,
            v if v.starts_with('!') => return Err(ScriptError::Runtime(v[1..].to_string())),
            v => match v.parse::<f64>() {
                Ok(n) => ScriptValue::Number(n),
                Err(_) => ScriptValue::String(v.to_string()),
            },
        })
    }

    fn bind(&mut self, name: &str, value: ScriptValue) -> ScriptResult<()> {
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct TableEngineFactory;

impl ScriptEngineFactory for TableEngineFactory {
    fn language(&self) -> &str {
        "table"
    }

    fn create(&self) -> ScriptResult<Box<dyn ScriptEngine>> {
        Ok(Box::new(TableEngine::default()))
    }
}
