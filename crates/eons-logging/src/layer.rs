//! Tracing layer that forwards to the console sink

use crate::reload::{LevelHandle, ReloadHandle, convert_level_to_filter};
use crate::sink::{ConsoleSinkManager, StderrSink};
use eons_core::LogLevel;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding an `EnvFilter` directive, e.g. `eons_host=debug`.
pub const LOG_ENV: &str = "EONS_LOG";

/// Tracing layer that formats events as text lines for a [`ConsoleSink`](crate::ConsoleSink)
pub struct ConsoleLayer {
    manager: &'static ConsoleSinkManager,
}

impl ConsoleLayer {
    /// Create a console layer using the global sink manager
    pub fn new() -> Self {
        Self {
            manager: ConsoleSinkManager::global(),
        }
    }

    /// Create a layer with a specific sink manager
    pub fn with_manager(manager: &'static ConsoleSinkManager) -> Self {
        Self { manager }
    }

    fn convert_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl Default for ConsoleLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::convert_level(metadata.level());

        if !self.manager.is_enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.manager
            .log(level, metadata.target(), &visitor.into_message());
    }

    fn enabled(&self, metadata: &tracing::Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        let level = Self::convert_level(metadata.level());
        self.manager.is_enabled(level)
    }
}

/// Collects the message and appends the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn into_message(self) -> String {
        match self.message {
            Some(mut message) => {
                message.push_str(&self.fields);
                message
            }
            None => self.fields.trim_start().to_string(),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Build the console subscriber for `level`, or for an `EnvFilter`
/// `directive` when one is given, non-empty and valid.
///
/// A directive replaces the level: the reload filter and `manager` are opened
/// to `TRACE` so only the directive decides. The returned flag reports whether
/// the directive was used.
pub(crate) fn console_subscriber(
    level: LogLevel,
    directive: Option<&str>,
    manager: &'static ConsoleSinkManager,
) -> (impl Subscriber + Send + Sync + 'static, LevelHandle, bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::reload;

    let env_filter = directive
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok());
    let env_override = env_filter.is_some();
    let level = if env_override { LogLevel::Trace } else { level };
    let env_filter = env_filter
        .unwrap_or_else(|| EnvFilter::new(level.to_string().to_ascii_lowercase()));
    manager.set_level(level);

    let (level_filter, handle) = reload::Layer::new(convert_level_to_filter(level));
    let subscriber = tracing_subscriber::registry()
        .with(level_filter)
        .with(env_filter)
        .with(ConsoleLayer::with_manager(manager));
    (subscriber, handle, env_override)
}

/// Initialize logging with the console layer
///
/// Installs [`StderrSink`] unless a sink was already set and registers a
/// global subscriber at `level`. When [`LOG_ENV`] holds a valid directive it
/// replaces `level` entirely, so it can both raise and narrow output. Returns
/// `false` if a global subscriber was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    let manager = ConsoleSinkManager::global();
    if !manager.has_sink() {
        manager.set_sink(Some(Arc::new(StderrSink)));
    }

    let directive = std::env::var(LOG_ENV).ok();
    let (subscriber, handle, env_override) =
        console_subscriber(level, directive.as_deref(), manager);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    ReloadHandle::global().set_handle(handle, manager, env_override);
    true
}
