//! The plug-in contract

use crate::{Image, PluginContext, PluginResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the host drives a plug-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    /// Shown from a menu item; toggled on and off by the user.
    #[default]
    Activated = 0,
    /// Started once after loading; its changes stay until it is unloaded.
    Injected = 1,
    /// Started exactly once at boot, before the data lock.
    Extension = 2,
}

impl PluginType {
    /// Map the integer constant used by scripts.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PluginType::Activated),
            1 => Some(PluginType::Injected),
            2 => Some(PluginType::Extension),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Whether an instance may be stopped and replaced by a new one.
    ///
    /// Extensions are started once; every other type can be reloaded.
    pub fn is_reloadable(&self) -> bool {
        !matches!(self, PluginType::Extension)
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginType::Activated => write!(f, "ACTIVATED"),
            PluginType::Injected => write!(f, "INJECTED"),
            PluginType::Extension => write!(f, "EXTENSION"),
        }
    }
}

/// Main trait for implementing plug-ins
///
/// The host creates a new instance for every start, calls
/// [`initialize`](Plugin::initialize) once, and after
/// [`unload`](Plugin::unload) discards the instance.
/// Methods take `&self` because the host and a plug-in's own callbacks may
/// hold the instance at the same time; use interior mutability for state.
///
/// # Example
///
/// ```
/// use eons_core::prelude::*;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Deck {
///     showing: AtomicBool,
/// }
///
/// impl Plugin for Deck {
///     fn initialize(&self, ctx: &PluginContext) -> PluginResult<bool> {
///         ctx.settings().set_default("deck-size", "52");
///         Ok(true)
///     }
///
///     fn unload(&self) -> PluginResult<()> {
///         Ok(())
///     }
///
///     fn name(&self) -> String {
///         "Deck".to_string()
///     }
///
///     fn show(&self, _ctx: &PluginContext, show: bool) -> PluginResult<()> {
///         self.showing.store(show, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn is_showing(&self) -> bool {
///         self.showing.load(Ordering::SeqCst)
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + 'static {
    /// Called once after the instance is created.
    ///
    /// Returning `Ok(false)` or an error means the plug-in cannot run;
    /// the host marks its bundle as failed.
    fn initialize(&self, ctx: &PluginContext) -> PluginResult<bool>;

    /// Called before the instance is discarded.
    fn unload(&self) -> PluginResult<()>;

    /// Display name
    fn name(&self) -> String;

    /// Short description
    fn description(&self) -> String {
        String::new()
    }

    /// Plug-in version
    fn version(&self) -> f64 {
        1.0
    }

    fn plugin_type(&self) -> PluginType {
        PluginType::Activated
    }

    /// Show or hide an [`Activated`](PluginType::Activated) plug-in.
    fn show(&self, _ctx: &PluginContext, _show: bool) -> PluginResult<()> {
        Ok(())
    }

    fn is_showing(&self) -> bool {
        false
    }

    /// Whether the plug-in can be activated right now.
    fn is_usable(&self) -> bool {
        true
    }

    /// Image representing the plug-in in menus and lists
    fn representative_image(&self) -> Option<Image> {
        None
    }

    /// Default menu accelerator, such as `ctrl shift D`
    fn default_accelerator_key(&self) -> Option<String> {
        None
    }
}
