//! The script engine seam

use crate::ScriptResult;
use eons_core::PluginContext;
use std::fmt;

/// A value passed to or returned from a script.
#[derive(Clone, Default)]
pub enum ScriptValue {
    /// No value, such as the result of a function without `return`
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// The host context object
    Context(PluginContext),
}

impl ScriptValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Undefined => "undefined",
            ScriptValue::Null => "null",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Context(_) => "object",
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => write!(f, "undefined"),
            ScriptValue::Null => write!(f, "null"),
            ScriptValue::Bool(b) => write!(f, "{b}"),
            ScriptValue::Number(n) => write!(f, "{n}"),
            ScriptValue::String(s) => write!(f, "{s:?}"),
            ScriptValue::Context(_) => write!(f, "[PluginContext]"),
        }
    }
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b)) => a == b,
            (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
            (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
            (ScriptValue::Context(a), ScriptValue::Context(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Bool(b)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::String(s)
    }
}

impl From<PluginContext> for ScriptValue {
    fn from(ctx: PluginContext) -> Self {
        ScriptValue::Context(ctx)
    }
}

/// A script interpreter holding one global scope.
///
/// Calls run synchronously on the calling thread.
pub trait ScriptEngine: Send {
    /// Evaluate source text in the global scope. `name` labels the source
    /// in error messages.
    fn evaluate(&mut self, source: &str, name: &str) -> ScriptResult<ScriptValue>;

    /// Call a global function.
    ///
    /// Returns [`ScriptError::NoSuchFunction`](crate::ScriptError::NoSuchFunction)
    /// when the function is not defined.
    fn call(&mut self, function: &str, args: &[ScriptValue]) -> ScriptResult<ScriptValue>;

    /// Bind a global variable.
    fn bind(&mut self, name: &str, value: ScriptValue) -> ScriptResult<()>;
}

/// Creates a fresh engine for each scripted plug-in instance.
pub trait ScriptEngineFactory: Send + Sync {
    /// Name of the script language, for diagnostics
    fn language(&self) -> &str;

    fn create(&self) -> ScriptResult<Box<dyn ScriptEngine>>;
}
