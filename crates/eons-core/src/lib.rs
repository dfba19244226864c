//! eons-core - Plug-in contract, contexts and settings
//!
//! This crate provides the types shared by plug-ins and the host:
//! - [`Plugin`] trait implemented by native and scripted plug-ins
//! - [`PluginContext`] and [`ContextFactory`] for the capability object
//!   handed to plug-in entry points
//! - [`Settings`] and [`SettingsNamespace`] for per-plug-in settings
//! - [`LifecycleState`] and [`FailureTracker`] for lifecycle bookkeeping
//! - [`PluginError`] for error handling

mod context;
mod error;
mod failure;
mod image;
mod lifecycle;
mod modifiers;
mod plugin;
mod resources;
mod settings;

pub use context::{ContextFactory, DUMMY_NAMESPACE, InstalledObject, PluginContext};
pub use error::{PluginError, PluginResult};
pub use failure::FailureTracker;
pub use image::Image;
pub use lifecycle::LifecycleState;
pub use modifiers::ActivationModifiers;
pub use plugin::{Plugin, PluginType};
pub use resources::ResourceLocator;
pub use settings::{Settings, SettingsNamespace};

/// Log levels for console sinks
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }

    /// Parse a level name such as `info` or `WARN`.
    ///
    /// Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "off" => Some(LogLevel::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActivationModifiers, LifecycleState, LogLevel, Plugin, PluginContext, PluginError,
        PluginResult, PluginType,
    };
}
