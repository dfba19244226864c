//! Console sinks and the manager that routes lines to them

use eons_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Destination for formatted log lines.
///
/// Hosts that render a console window implement this to receive every line
/// that passes the level filter.
pub trait ConsoleSink: Send + Sync {
    /// Receive one formatted line, without a trailing newline.
    fn write_line(&self, level: LogLevel, line: &str);
}

/// Sink that writes each line to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl ConsoleSink for StderrSink {
    fn write_line(&self, _level: LogLevel, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // nowhere left to report a failed write
        let _ = writeln!(stderr, "{line}");
    }
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the collected lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Remove and return the collected lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl ConsoleSink for BufferSink {
    fn write_line(&self, _level: LogLevel, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Global console sink manager
pub struct ConsoleSinkManager {
    sink: RwLock<Option<Arc<dyn ConsoleSink>>>,
    level: AtomicU8,
}

impl ConsoleSinkManager {
    /// Create a manager with no sink and level `Info`.
    pub fn new() -> Self {
        Self {
            sink: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// Get the global manager instance
    pub fn global() -> &'static ConsoleSinkManager {
        static INSTANCE: OnceCell<ConsoleSinkManager> = OnceCell::new();
        INSTANCE.get_or_init(ConsoleSinkManager::new)
    }

    /// Replace the sink. `None` discards all output.
    pub fn set_sink(&self, sink: Option<Arc<dyn ConsoleSink>>) {
        *self.sink.write() = sink;
    }

    pub fn sink(&self) -> Option<Arc<dyn ConsoleSink>> {
        self.sink.read().clone()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// Check if a message at `level` would be written.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Format a line as `LEVEL target: message` and hand it to the sink.
    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.is_enabled(level) {
            return;
        }

        // clone out of the lock so a sink that logs cannot deadlock
        let Some(sink) = self.sink() else {
            return;
        };
        sink.write_line(level, &format_line(level, target, message));
    }
}

impl Default for ConsoleSinkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsoleSinkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSinkManager")
            .field("has_sink", &self.has_sink())
            .field("level", &self.level())
            .finish()
    }
}

pub(crate) fn format_line(level: LogLevel, target: &str, message: &str) -> String {
    if target.is_empty() {
        format!("{level} {message}")
    } else {
        format!("{level} {target}: {message}")
    }
}
