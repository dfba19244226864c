//! Error types for script evaluation

use thiserror::Error;

/// Result type alias for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors reported by a script engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// The script text could not be compiled
    #[error("syntax error in {script}: {message}")]
    Syntax { script: String, message: String },

    /// The script raised an error while running
    #[error("script error: {0}")]
    Runtime(String),

    /// The script does not define the function
    #[error("no such function: {0}")]
    NoSuchFunction(String),

    /// The engine is already running a call for this plug-in on this thread
    #[error("script engine is busy")]
    Busy,

    /// No engine could be created
    #[error("script engine unavailable: {0}")]
    Unavailable(String),
}

impl ScriptError {
    /// True when the error only says the function is not defined.
    pub fn is_missing_function(&self) -> bool {
        matches!(self, ScriptError::NoSuchFunction(_))
    }
}
