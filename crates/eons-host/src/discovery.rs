//! Discovery of installed bundles
//!
//! Scans plug-in directories for bundle files and turns each one into
//! installed objects. A broken bundle is reported and skipped; it never
//! stops the scan.

use crate::installed::sort_objects;
use crate::{Bundle, InstalledBundleObject, PluginServices};
use eons_bundle::{BundleKind, SpecialDefinitionKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A bundle file that discovery could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBundle {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a discovery scan.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Installed objects in install order
    pub objects: Vec<Arc<InstalledBundleObject>>,
    /// Bundles that were opened successfully, in scan order
    pub bundles: Vec<Arc<Bundle>>,
    pub skipped: Vec<SkippedBundle>,
}

impl DiscoveryReport {
    fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), reason = %reason, "Skipping bundle");
        self.skipped.push(SkippedBundle {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Scan `dirs` for bundles and create their installed objects.
///
/// Directories are not searched recursively. Files are visited in name
/// order so that results do not depend on directory iteration order.
/// `-S` definitions from each root descriptor become settings defaults.
pub fn discover(dirs: &[PathBuf], services: &Arc<PluginServices>) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                report.skip(dir, format!("cannot read plug-in directory: {e}"));
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            let Some(kind) = BundleKind::from_path(&path) else {
                continue;
            };
            discover_bundle(&path, kind, services, &mut report);
        }
    }

    sort_objects(&mut report.objects);
    info!(
        objects = report.objects.len(),
        bundles = report.bundles.len(),
        skipped = report.skipped.len(),
        "Discovery complete"
    );
    report
}

fn discover_bundle(
    path: &Path,
    kind: BundleKind,
    services: &Arc<PluginServices>,
    report: &mut DiscoveryReport,
) {
    let bundle = match Bundle::open(path, kind) {
        Ok(bundle) => Arc::new(bundle),
        Err(e) => {
            report.skip(path, e.to_string());
            return;
        }
    };

    let Some(root) = bundle.root() else {
        if kind == BundleKind::Library {
            report.bundles.push(Arc::clone(&bundle));
            report
                .objects
                .push(InstalledBundleObject::library(bundle, Arc::clone(services)));
        } else {
            report.skip(path, "bundle has no eons-plugin root file");
        }
        return;
    };

    for error in root.errors() {
        warn!(path = %path.display(), line = error.line, "Root file error: {}", error.message);
    }

    for definition in root.special_definitions() {
        if definition.kind == SpecialDefinitionKind::Setting
            && services
                .settings()
                .set_default(&definition.name, &definition.value)
        {
            debug!(key = %definition.name, "Applied default setting from root file");
        }
    }

    if kind == BundleKind::Library {
        report.bundles.push(Arc::clone(&bundle));
        report.objects.push(InstalledBundleObject::library(
            Arc::clone(&bundle),
            Arc::clone(services),
        ));
        return;
    }

    if root.identifiers().is_empty() {
        report.skip(path, format!("{kind} bundle lists no identifiers"));
        return;
    }

    report.bundles.push(Arc::clone(&bundle));
    for identifier in root.identifiers() {
        report.objects.push(InstalledBundleObject::new(
            Arc::clone(&bundle),
            Some(identifier.clone()),
            Arc::clone(services),
        ));
    }
}

#[cfg(test)]
#[path = "discovery/discovery_tests.rs"]
mod discovery_tests;
