//! Error types for plug-ins and their contexts

use thiserror::Error;

/// Result type alias for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error type for plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    /// Plugin is not in a valid state for the requested operation
    #[error("invalid lifecycle state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Failed to initialize the plugin
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// Failed to unload the plugin
    #[error("unload failed: {0}")]
    UnloadFailed(String),

    /// A show or hide request failed
    #[error("show failed: {0}")]
    ShowFailed(String),

    /// Settings could not be read or written
    #[error("settings error: {0}")]
    SettingsError(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A resource could not be read
    #[error("resource error: {0}")]
    ResourceError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl PluginError {
    /// Returns a stable numeric code for the error kind
    pub fn error_code(&self) -> u32 {
        match self {
            PluginError::InvalidState { .. } => 1,
            PluginError::InitializationFailed(_) => 2,
            PluginError::UnloadFailed(_) => 3,
            PluginError::ShowFailed(_) => 4,
            PluginError::SettingsError(_) => 5,
            PluginError::SerializationError(_) => 6,
            PluginError::ResourceError(_) => 7,
            PluginError::Io(_) => 8,
            PluginError::Internal(_) => 9,
        }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::SerializationError(err.to_string())
    }
}
