//! Installed bundle objects
//!
//! Every discovered bundle yields one [`InstalledBundleObject`] per thing
//! it installs: one for a library, and one per identifier listed by a
//! theme, extension or plug-in bundle. The object's [`BundleKind`] is its
//! primary sort key, so libraries are always installed before the themes,
//! extensions and plug-ins that may depend on them.

use crate::{LifecycleError, PluginInfo, PluginLifecycle, PluginServices};
use eons_bundle::{
    BundleArchive, BundleKind, BundleResult, CatalogId, PluginIdentifier, Priority,
    RootDescriptor,
};
use eons_core::{ActivationModifiers, Image, InstalledObject, Plugin};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::warn;

const NAME_KEY: &str = "name";
const DESCRIPTION_KEY: &str = "description";
const IMAGE_KEY: &str = "image";

/// A bundle file and the root descriptor read from it.
///
/// Shared by every installed object created from the bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    path: PathBuf,
    kind: BundleKind,
    root: Option<RootDescriptor>,
}

impl Bundle {
    pub fn new(path: impl Into<PathBuf>, kind: BundleKind, root: Option<RootDescriptor>) -> Self {
        Self {
            path: path.into(),
            kind,
            root,
        }
    }

    /// Open a bundle file and read its root descriptor.
    ///
    /// Wrapped bundles are materialized to read the root and the temporary
    /// copy is removed before returning.
    pub fn open<P: AsRef<Path>>(path: P, kind: BundleKind) -> BundleResult<Self> {
        let path = path.as_ref();
        let mut archive = BundleArchive::open(path)?;
        let root = RootDescriptor::from_archive(&mut archive)?;
        archive.dispose();
        Ok(Self::new(path, kind, root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    pub fn root(&self) -> Option<&RootDescriptor> {
        self.root.as_ref()
    }

    pub fn catalog_id(&self) -> Option<CatalogId> {
        self.root.as_ref().and_then(|root| root.catalog_id().copied())
    }

    /// Priority from the root descriptor, or the default when there is none
    pub fn priority(&self) -> Priority {
        self.root
            .as_ref()
            .map(RootDescriptor::priority)
            .unwrap_or_default()
    }

    /// File name without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Display metadata of an installed object.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub icon: Option<Image>,
    /// Metadata read from the plug-in, for objects that host one
    pub plugin: Option<PluginInfo>,
}

/// One installable unit of a bundle.
pub struct InstalledBundleObject {
    bundle: Arc<Bundle>,
    identifier: Option<PluginIdentifier>,
    lifecycle: Option<PluginLifecycle>,
    metadata: RwLock<Option<Arc<Metadata>>>,
    services: Arc<PluginServices>,
}

impl InstalledBundleObject {
    /// Create the object for `identifier` in `bundle`.
    ///
    /// Extension and plug-in bundles get a lifecycle manager for their
    /// plug-in; libraries and themes do not.
    pub fn new(
        bundle: Arc<Bundle>,
        identifier: Option<PluginIdentifier>,
        services: Arc<PluginServices>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let lifecycle = match &identifier {
                Some(id) if bundle.kind().has_plugins() => {
                    let owner: Weak<dyn InstalledObject> = this.clone();
                    Some(PluginLifecycle::new(
                        id.clone(),
                        bundle.catalog_id().map(|catalog| catalog.uuid()),
                        owner,
                        Arc::clone(&services),
                    ))
                }
                _ => None,
            };
            Self {
                bundle,
                identifier,
                lifecycle,
                metadata: RwLock::new(None),
                services,
            }
        })
    }

    pub fn library(bundle: Arc<Bundle>, services: Arc<PluginServices>) -> Arc<Self> {
        Self::new(bundle, None, services)
    }

    pub fn kind(&self) -> BundleKind {
        self.bundle.kind()
    }

    pub fn bundle(&self) -> &Arc<Bundle> {
        &self.bundle
    }

    pub fn path(&self) -> &Path {
        self.bundle.path()
    }

    pub fn root(&self) -> Option<&RootDescriptor> {
        self.bundle.root()
    }

    pub fn identifier(&self) -> Option<&PluginIdentifier> {
        self.identifier.as_ref()
    }

    pub fn priority(&self) -> Priority {
        self.bundle.priority()
    }

    pub fn catalog_id(&self) -> Option<CatalogId> {
        self.bundle.catalog_id()
    }

    /// Short label for logs: the decorated identifier or the file name.
    pub fn label(&self) -> String {
        match &self.identifier {
            Some(id) => id.decorated().to_string(),
            None => self
                .path()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The lifecycle manager, for objects that host a plug-in.
    pub fn lifecycle(&self) -> Option<&PluginLifecycle> {
        self.lifecycle.as_ref()
    }

    fn require_lifecycle(&self) -> Result<&PluginLifecycle, LifecycleError> {
        self.lifecycle
            .as_ref()
            .ok_or_else(|| LifecycleError::NotAPlugin(self.label()))
    }

    pub fn start(&self, modifiers: ActivationModifiers) -> Result<Arc<dyn Plugin>, LifecycleError> {
        self.require_lifecycle()?.start(modifiers)
    }

    pub fn stop(&self) -> Result<(), LifecycleError> {
        self.require_lifecycle()?.stop()
    }

    pub fn activate(&self, modifiers: ActivationModifiers) -> Result<bool, LifecycleError> {
        self.require_lifecycle()?.activate(modifiers)
    }

    pub fn is_started(&self) -> bool {
        self.lifecycle.as_ref().is_some_and(PluginLifecycle::is_started)
    }

    /// The running plug-in instance, if any
    pub fn plugin(&self) -> Option<Arc<dyn Plugin>> {
        self.lifecycle.as_ref().and_then(PluginLifecycle::plugin)
    }

    /// Plug-in metadata, probing the plug-in if it was never started.
    pub fn plugin_info(&self) -> Option<PluginInfo> {
        self.lifecycle
            .as_ref()
            .map(PluginLifecycle::collect_plugin_info)
    }

    /// Check if metadata has been resolved.
    ///
    /// For plug-ins this becomes true after a probe or the first start.
    pub fn is_loaded(&self) -> bool {
        match &self.lifecycle {
            Some(lifecycle) => lifecycle.info().is_some(),
            None => self.metadata.read().is_some(),
        }
    }

    /// Display metadata, resolved on first use.
    ///
    /// For a plug-in that has never run this starts it once to read its
    /// metadata; see [`PluginLifecycle::collect_plugin_info`].
    pub fn metadata(&self) -> Arc<Metadata> {
        if let Some(metadata) = self.metadata.read().as_ref() {
            return Arc::clone(metadata);
        }

        let resolved = Arc::new(self.resolve_metadata());
        // a nested request during the plug-in's own start gets placeholders
        if !self.is_loaded() && self.lifecycle.is_some() {
            return resolved;
        }
        Arc::clone(self.metadata.write().get_or_insert(resolved))
    }

    pub fn name(&self) -> String {
        self.metadata().name.clone()
    }

    pub fn description(&self) -> String {
        self.metadata().description.clone()
    }

    pub fn icon(&self) -> Option<Image> {
        self.metadata().icon.clone()
    }

    fn resolve_metadata(&self) -> Metadata {
        let locale = self.services.locale();
        let root = self.root();
        let localized =
            |key: &str| root.and_then(|root| root.localized_client_property(key, locale));

        let fallback_name = || match &self.identifier {
            Some(id) => id.simple_name().to_string(),
            None => self.bundle.stem(),
        };

        match &self.lifecycle {
            Some(lifecycle) => {
                let info = lifecycle.collect_plugin_info();
                let name = if info.name.trim().is_empty() {
                    localized(NAME_KEY).map_or_else(fallback_name, str::to_string)
                } else {
                    info.name.clone()
                };
                Metadata {
                    name,
                    description: info.description.clone(),
                    icon: info.image.clone().or_else(|| self.root_icon()),
                    plugin: Some(info),
                }
            }
            None => Metadata {
                name: localized(NAME_KEY).map_or_else(fallback_name, str::to_string),
                description: localized(DESCRIPTION_KEY).unwrap_or_default().to_string(),
                icon: self.root_icon(),
                plugin: None,
            },
        }
    }

    fn root_icon(&self) -> Option<Image> {
        let value = self.root()?.client_property(IMAGE_KEY)?;
        let url = if value.starts_with("res:") {
            value.to_string()
        } else {
            format!("res://{}", value.trim_start_matches('/'))
        };
        let resources = self.services.registry().resources()?;
        match Image::load(resources.as_ref(), &url) {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    bundle = %self.path().display(),
                    url = %url,
                    error = %e,
                    "Could not load bundle image"
                );
                None
            }
        }
    }

    /// Name used for ordering, without resolving anything
    fn resolved_name(&self) -> Option<String> {
        if let Some(metadata) = self.metadata.read().as_ref() {
            return Some(metadata.name.clone());
        }
        self.lifecycle
            .as_ref()
            .and_then(PluginLifecycle::info)
            .map(|info| info.name)
    }

    /// Install and display order.
    ///
    /// Objects sort by kind (libraries first), then by priority, then by
    /// name ignoring case. An object whose metadata has not been resolved
    /// sorts after every resolved object at the same kind and priority.
    /// Among objects from releases of the same name, newer catalog stamps
    /// come first. Comparing never resolves metadata.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.kind()
            .cmp(&other.kind())
            .then_with(|| self.priority().cmp(&other.priority()))
            .then_with(|| match (self.resolved_name(), other.resolved_name()) {
                (Some(a), Some(b)) => compare_names(&a, &b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| match (self.catalog_id(), other.catalog_id()) {
                (Some(a), Some(b)) => a.cmp_recency(&b),
                _ => Ordering::Equal,
            })
            .then_with(|| self.identifier.cmp(&other.identifier))
            .then_with(|| self.path().cmp(other.path()))
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sort objects into install order.
pub fn sort_objects(objects: &mut [Arc<InstalledBundleObject>]) {
    objects.sort_by(|a, b| a.compare(b));
}

impl InstalledObject for InstalledBundleObject {
    fn kind(&self) -> BundleKind {
        self.bundle.kind()
    }

    fn catalog_id(&self) -> Option<CatalogId> {
        self.bundle.catalog_id()
    }

    fn identifier(&self) -> Option<PluginIdentifier> {
        self.identifier.clone()
    }

    fn name(&self) -> String {
        InstalledBundleObject::name(self)
    }
}

impl fmt::Debug for InstalledBundleObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledBundleObject")
            .field("kind", &self.kind())
            .field("path", &self.path())
            .field("identifier", &self.identifier.as_ref().map(|id| id.to_string()))
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
