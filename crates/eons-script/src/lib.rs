//! eons-script - Scripted plug-ins
//!
//! This crate adapts the [`Plugin`](eons_core::Plugin) contract onto a
//! script back end. The script language itself lives behind the narrow
//! [`ScriptEngine`] trait: evaluate source text, call a named function,
//! bind a named value. Embedders supply an engine through a
//! [`ScriptEngineFactory`].
//!
//! A plug-in script defines any of these functions; all are optional:
//!
//! | function | used for |
//! |---|---|
//! | `initialize()` | returning `false` cancels the start |
//! | `getName()`, `getDescription()`, `getVersion()` | metadata |
//! | `getPluginType()` | `0` activated, `1` injected, `2` extension |
//! | `run()` | called when an activated plug-in is shown |
//! | `unload()` | called before the instance is discarded |
//! | `isPluginShowing()`, `isPluginUsable()` | state queries |
//! | `getDefaultAcceleratorKey()`, `getRepresentativeImage()` | menu decoration |
//!
//! The context of the current call is bound as `PluginContext`.

mod adapter;
mod engine;
mod error;

pub use adapter::{CONTEXT_BINDING, ScriptedPlugin};
pub use engine::{ScriptEngine, ScriptEngineFactory, ScriptValue};
pub use error::{ScriptError, ScriptResult};
