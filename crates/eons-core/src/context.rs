//! Plug-in contexts and the factory that creates them
//!
//! A [`PluginContext`] is the capability object handed to plug-in entry
//! points. It ties together the installed bundle object a plug-in came
//! from, the running instance, the modifier keys held on activation, and
//! a settings namespace private to that plug-in.

use crate::{ActivationModifiers, Plugin, Settings, SettingsNamespace};
use eons_bundle::{BundleKind, CatalogId, PluginIdentifier};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::warn;

/// Settings prefix shared by every context without an installed object.
///
/// Ad hoc script runs all use this namespace and can see each other's
/// settings.
pub const DUMMY_NAMESPACE: &str = "eons-script:";

/// What a context needs to know about the installed bundle object that
/// owns a plug-in.
pub trait InstalledObject: Send + Sync {
    fn kind(&self) -> BundleKind;

    fn catalog_id(&self) -> Option<CatalogId>;

    /// Normalized identifier of the plug-in, if the object hosts one
    fn identifier(&self) -> Option<PluginIdentifier>;

    /// Display name. May resolve metadata, which can start the plug-in.
    fn name(&self) -> String;
}

/// Capability object passed to plug-in entry points.
///
/// Cloning is cheap; clones share the lazily resolved settings namespace.
#[derive(Clone)]
pub struct PluginContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    owner: Option<Weak<dyn InstalledObject>>,
    plugin: Option<Weak<dyn Plugin>>,
    information_probe: bool,
    modifiers: ActivationModifiers,
    settings: Arc<Settings>,
    namespace: OnceCell<SettingsNamespace>,
}

impl PluginContext {
    fn new(
        owner: Option<Weak<dyn InstalledObject>>,
        plugin: Option<Weak<dyn Plugin>>,
        modifiers: ActivationModifiers,
        information_probe: bool,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                owner,
                plugin,
                information_probe,
                modifiers,
                settings,
                namespace: OnceCell::new(),
            }),
        }
    }

    /// True if both handles refer to the same context.
    pub fn ptr_eq(&self, other: &PluginContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The installed object that owns the plug-in, if it is still alive.
    pub fn owner(&self) -> Option<Arc<dyn InstalledObject>> {
        self.inner.owner.as_ref().and_then(Weak::upgrade)
    }

    /// The plug-in instance, if it is still alive.
    pub fn plugin(&self) -> Option<Arc<dyn Plugin>> {
        self.inner.plugin.as_ref().and_then(Weak::upgrade)
    }

    /// True when the plug-in is only being started to read its metadata.
    ///
    /// Plug-ins should skip expensive setup and avoid visible changes
    /// during a probe.
    pub fn is_information_probe(&self) -> bool {
        self.inner.information_probe
    }

    pub fn modifiers(&self) -> ActivationModifiers {
        self.inner.modifiers
    }

    /// True for contexts created without an installed object or instance.
    pub fn is_dummy(&self) -> bool {
        self.inner.owner.is_none() && self.inner.plugin.is_none()
    }

    /// Settings namespace private to this plug-in.
    ///
    /// The prefix comes from the owner's catalog uuid, or its identifier
    /// when it has no catalog id. It is resolved on first use.
    pub fn settings(&self) -> &SettingsNamespace {
        self.inner
            .namespace
            .get_or_init(|| self.inner.settings.namespace(self.namespace_prefix()))
    }

    /// The whole settings store, without a prefix
    pub fn global_settings(&self) -> &Arc<Settings> {
        &self.inner.settings
    }

    fn namespace_prefix(&self) -> String {
        let Some(weak) = &self.inner.owner else {
            return DUMMY_NAMESPACE.to_string();
        };
        let Some(owner) = weak.upgrade() else {
            warn!("Plug-in context outlived its owner; using the shared namespace");
            return DUMMY_NAMESPACE.to_string();
        };

        if let Some(catalog_id) = owner.catalog_id() {
            format!("{}:", catalog_id.uuid())
        } else if let Some(id) = owner.identifier() {
            format!("{id}:")
        } else {
            format!("{}:", owner.name())
        }
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field(
                "owner",
                &self
                    .owner()
                    .and_then(|owner| owner.identifier())
                    .map(|id| id.to_string()),
            )
            .field("has_plugin", &self.plugin().is_some())
            .field("information_probe", &self.inner.information_probe)
            .field("modifiers", &self.inner.modifiers)
            .finish()
    }
}

/// Creates plug-in contexts over one settings store.
///
/// The zero-modifier dummy context is created once and shared; dummy
/// contexts with modifiers are created fresh for every call.
pub struct ContextFactory {
    settings: Arc<Settings>,
    dummy: OnceCell<PluginContext>,
}

impl ContextFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            dummy: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Create a context for one start, activation or probe.
    ///
    /// With neither an owner nor a plug-in this is a dummy context; see
    /// [`create_dummy`](Self::create_dummy).
    pub fn create(
        &self,
        owner: Option<Weak<dyn InstalledObject>>,
        plugin: Option<&Arc<dyn Plugin>>,
        modifiers: ActivationModifiers,
        information_probe: bool,
    ) -> PluginContext {
        if owner.is_none() && plugin.is_none() && !information_probe {
            return self.create_dummy(modifiers);
        }
        PluginContext::new(
            owner,
            plugin.map(Arc::downgrade),
            modifiers,
            information_probe,
            Arc::clone(&self.settings),
        )
    }

    /// Context for running code outside any installed bundle.
    pub fn create_dummy(&self, modifiers: ActivationModifiers) -> PluginContext {
        if modifiers.is_empty() {
            return self
                .dummy
                .get_or_init(|| self.new_dummy(ActivationModifiers::NONE))
                .clone();
        }
        self.new_dummy(modifiers)
    }

    fn new_dummy(&self, modifiers: ActivationModifiers) -> PluginContext {
        PluginContext::new(None, None, modifiers, false, Arc::clone(&self.settings))
    }
}

impl fmt::Debug for ContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFactory")
            .field("settings", &self.settings.len())
            .field("dummy_created", &self.dummy.get().is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "context/context_tests.rs"]
mod context_tests;
