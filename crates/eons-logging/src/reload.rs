//! Dynamic log level reloading support

use crate::sink::ConsoleSinkManager;
use eons_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;

pub(crate) type LevelHandle = reload::Handle<LevelFilter, Registry>;

struct Installed {
    handle: LevelHandle,
    manager: &'static ConsoleSinkManager,
    env_override: bool,
}

/// Handle for changing the log level after [`init_logging`](crate::init_logging)
pub struct ReloadHandle {
    installed: Mutex<Option<Installed>>,
}

impl ReloadHandle {
    pub fn new() -> Self {
        Self {
            installed: Mutex::new(None),
        }
    }

    /// Get the global reload handle
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    pub(crate) fn set_handle(
        &self,
        handle: LevelHandle,
        manager: &'static ConsoleSinkManager,
        env_override: bool,
    ) {
        *self.installed.lock() = Some(Installed {
            handle,
            manager,
            env_override,
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.installed.lock().is_some()
    }

    /// Whether the filter came from [`LOG_ENV`](crate::LOG_ENV).
    pub fn is_env_override(&self) -> bool {
        self.installed
            .lock()
            .as_ref()
            .is_some_and(|installed| installed.env_override)
    }

    /// Switch the subscriber and the console sink to a new minimum level.
    ///
    /// Does nothing when the filter came from [`LOG_ENV`](crate::LOG_ENV).
    pub fn reload_level(&self, level: LogLevel) -> Result<(), String> {
        let guard = self.installed.lock();
        let installed = guard
            .as_ref()
            .ok_or_else(|| "Reload handle not initialized".to_string())?;
        if installed.env_override {
            return Ok(());
        }

        // The sink level must change first: reloading rebuilds callsite interest.
        let previous = installed.manager.level();
        installed.manager.set_level(level);
        if let Err(e) = installed.handle.reload(convert_level_to_filter(level)) {
            installed.manager.set_level(previous);
            return Err(format!("Failed to reload filter: {e}"));
        }
        Ok(())
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHandle")
            .field("initialized", &self.is_initialized())
            .field("env_override", &self.is_env_override())
            .finish()
    }
}

pub(crate) fn convert_level_to_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::layer::console_subscriber;
    use crate::sink::BufferSink;
    use std::sync::Arc;

    fn leaked_manager() -> (&'static ConsoleSinkManager, Arc<BufferSink>) {
        let manager: &'static ConsoleSinkManager = Box::leak(Box::new(ConsoleSinkManager::new()));
        let buffer = Arc::new(BufferSink::new());
        manager.set_sink(Some(buffer.clone()));
        (manager, buffer)
    }

    #[test]
    fn ReloadHandle___new___is_not_initialized() {
        let handle = ReloadHandle::new();

        assert!(!handle.is_initialized());
        assert!(handle.reload_level(LogLevel::Debug).is_err());
    }

    #[test]
    fn ReloadHandle___reload_level___raises_subscriber_and_sink_level() {
        let (manager, buffer) = leaked_manager();
        let (subscriber, level_handle, env_override) =
            console_subscriber(LogLevel::Warn, None, manager);
        let handle = ReloadHandle::new();
        handle.set_handle(level_handle, manager, env_override);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("before");
            handle.reload_level(LogLevel::Debug).unwrap();
            tracing::debug!("after");
        });

        assert_eq!(manager.level(), LogLevel::Debug);
        let lines = buffer.lines();
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines[0].ends_with("after"));
    }

    #[test]
    fn ReloadHandle___reload_level___env_override___keeps_env_filter() {
        let (manager, buffer) = leaked_manager();
        let (subscriber, level_handle, env_override) =
            console_subscriber(LogLevel::Warn, Some("debug"), manager);
        let handle = ReloadHandle::new();
        handle.set_handle(level_handle, manager, env_override);

        tracing::subscriber::with_default(subscriber, || {
            handle.reload_level(LogLevel::Error).unwrap();
            tracing::debug!("still shown");
        });

        assert!(handle.is_env_override());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn convert_level_to_filter___off___disables_everything() {
        assert_eq!(convert_level_to_filter(LogLevel::Off), LevelFilter::OFF);
        assert_eq!(convert_level_to_filter(LogLevel::Warn), LevelFilter::WARN);
    }
}
