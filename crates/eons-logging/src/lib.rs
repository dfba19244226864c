//! eons-logging - Tracing to console sink bridge
//!
//! This crate provides:
//! - [`ConsoleLayer`] tracing layer that formats events as text lines
//! - [`ConsoleSink`] destinations for those lines ([`StderrSink`], [`BufferSink`])
//! - Dynamic log level filtering through [`ConsoleSinkManager`] and [`ReloadHandle`]

mod layer;
mod reload;
mod sink;

pub use eons_core::LogLevel;
pub use layer::{ConsoleLayer, LOG_ENV, init_logging};
pub use reload::ReloadHandle;
pub use sink::{BufferSink, ConsoleSink, ConsoleSinkManager, StderrSink};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BufferSink, ConsoleLayer, ConsoleSink, ConsoleSinkManager, LogLevel, StderrSink,
        init_logging,
    };
}
