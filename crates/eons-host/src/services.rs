//! Collaborators shared by every installed object of a host

use crate::PluginRegistry;
use eons_bundle::Locale;
use eons_core::{ContextFactory, FailureTracker, Settings};
use std::sync::Arc;

/// Registry, failure tracker, context factory and locale.
///
/// One instance is shared by all installed objects of a host. Tests build
/// their own so that failure marks and settings do not leak between them.
#[derive(Debug)]
pub struct PluginServices {
    registry: PluginRegistry,
    failures: Arc<FailureTracker>,
    contexts: ContextFactory,
    locale: Locale,
}

impl PluginServices {
    pub fn new(settings: Arc<Settings>, failures: Arc<FailureTracker>, locale: Locale) -> Self {
        Self {
            registry: PluginRegistry::new(),
            failures,
            contexts: ContextFactory::new(settings),
            locale,
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn failures(&self) -> &Arc<FailureTracker> {
        &self.failures
    }

    pub fn contexts(&self) -> &ContextFactory {
        &self.contexts
    }

    pub fn settings(&self) -> &Arc<Settings> {
        self.contexts.settings()
    }

    /// Locale used to pick localized names and descriptions
    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

impl Default for PluginServices {
    fn default() -> Self {
        Self::new(
            Arc::new(Settings::new()),
            Arc::new(FailureTracker::new()),
            Locale::default(),
        )
    }
}
