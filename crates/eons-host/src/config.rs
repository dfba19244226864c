//! Host configuration

use crate::HostResult;
use eons_bundle::Locale;
use eons_core::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Host configuration, usually read from a TOML file.
///
/// ```toml
/// plugin_dirs = ["/usr/share/eons/plugins", "~/.eons/plugins"]
/// locale = "en_CA"
/// log_level = "debug"
/// settings_file = "settings.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directories scanned for bundles, in order
    #[serde(default)]
    pub plugin_dirs: Vec<PathBuf>,

    /// Locale for localized names and descriptions (`ll` or `ll_CC`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON file that settings are loaded from and saved to
    #[serde(default)]
    pub settings_file: Option<PathBuf>,

    /// Start extensions right after discovery
    #[serde(default = "default_true")]
    pub auto_start_extensions: bool,

    /// Probe plug-ins and start injected ones after extensions
    #[serde(default = "default_true")]
    pub load_plugins: bool,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugin_dirs: Vec::new(),
            locale: default_locale(),
            log_level: default_log_level(),
            settings_file: None,
            auto_start_extensions: true,
            load_plugins: true,
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. An empty document yields the defaults.
    pub fn from_toml_str(text: &str) -> HostResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file.
    ///
    /// Relative `plugin_dirs` and `settings_file` paths are resolved against
    /// the directory holding the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> HostResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    fn resolve_relative(&mut self, base: &Path) {
        for dir in &mut self.plugin_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        if let Some(file) = &mut self.settings_file {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Add a plug-in directory.
    #[must_use]
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dirs.push(dir.into());
        self
    }

    pub fn locale(&self) -> Locale {
        Locale::parse(&self.locale)
    }

    /// The configured log level, or `Info` when the name is not recognized.
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }
}
