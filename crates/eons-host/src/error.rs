//! Error types for the plug-in host

use eons_bundle::BundleError;
use eons_core::{LifecycleState, PluginError};
use eons_script::ScriptError;
use thiserror::Error;

/// Why a plug-in could not be started, stopped or shown.
///
/// Identifiers are carried in their decorated form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("plug-in {identifier} failed to initialize: {reason}")]
    InitializationFailed { identifier: String, reason: String },

    #[error("plug-in {identifier} failed to stop: {reason}")]
    StopFailed { identifier: String, reason: String },

    #[error("plug-in {identifier} failed to show: {reason}")]
    ShowFailed { identifier: String, reason: String },

    /// An extension was started again after its instance stopped.
    #[error("extension {0} was already started once and cannot be restarted")]
    ExtensionRestart(String),

    #[error("no native plug-in is registered as {0}")]
    NotRegistered(String),

    #[error("cannot load script {identifier}: {reason}")]
    ScriptUnavailable { identifier: String, reason: String },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A lifecycle operation was requested from inside another one on the
    /// same object.
    #[error("plug-in {identifier} is {state}; nested lifecycle calls are not allowed")]
    Reentrant {
        identifier: String,
        state: LifecycleState,
    },

    #[error("{0} does not host a plug-in")]
    NotAPlugin(String),

    #[error("plug-in {identifier} cannot go from {from} to {to}")]
    InvalidState {
        identifier: String,
        from: LifecycleState,
        to: LifecycleState,
    },
}

impl LifecycleError {
    /// Get the identifier this error is about.
    pub fn identifier(&self) -> &str {
        match self {
            LifecycleError::InitializationFailed { identifier, .. }
            | LifecycleError::StopFailed { identifier, .. }
            | LifecycleError::ShowFailed { identifier, .. }
            | LifecycleError::ScriptUnavailable { identifier, .. }
            | LifecycleError::Reentrant { identifier, .. }
            | LifecycleError::InvalidState { identifier, .. } => identifier,
            LifecycleError::ExtensionRestart(identifier)
            | LifecycleError::NotRegistered(identifier)
            | LifecycleError::ResourceNotFound(identifier)
            | LifecycleError::NotAPlugin(identifier) => identifier,
        }
    }

    /// Check if this error points at a defect in the calling code rather
    /// than in the plug-in.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            LifecycleError::ExtensionRestart(_)
                | LifecycleError::Reentrant { .. }
                | LifecycleError::NotAPlugin(_)
                | LifecycleError::InvalidState { .. }
        )
    }
}

/// Errors raised by host operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot register {identifier}: {reason}")]
    Registration { identifier: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for HostError {
    fn from(err: toml::de::Error) -> Self {
        HostError::Config(err.to_string())
    }
}

/// Result type alias for host operations
pub type HostResult<T> = Result<T, HostError>;
