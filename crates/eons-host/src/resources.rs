//! Resource locators backed by directories and bundle archives

use eons_bundle::{BundleArchive, BundleError, BundleResult};
use eons_core::{PluginError, PluginResult, ResourceLocator};
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RESOURCE_ROOT: &str = "res://";
const RESOURCES_DIR: &str = "resources/";

/// Map a `res://` url to a path relative to a bundle root.
///
/// `res://x` names `resources/x` and `res:///x` names `x`. Returns `None`
/// for other schemes. Paths that climb out of the root are rejected.
pub fn resource_entry(url: &str) -> PluginResult<Option<String>> {
    let Some(path) = url.trim().strip_prefix(RESOURCE_ROOT) else {
        return Ok(None);
    };

    let entry = match path.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{RESOURCES_DIR}{path}"),
    };

    if entry.split('/').any(|segment| segment == "..") {
        return Err(PluginError::ResourceError(format!(
            "{url} points outside the bundle"
        )));
    }
    Ok(Some(entry))
}

/// Resources laid out on disk the way they are laid out in a bundle.
///
/// Useful while developing a plug-in, before it is packaged.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a url maps to, whether or not it exists.
    pub fn path_of(&self, url: &str) -> PluginResult<Option<PathBuf>> {
        Ok(resource_entry(url)?.map(|entry| self.root.join(entry)))
    }
}

impl ResourceLocator for DirectoryResources {
    fn read_resource(&self, url: &str) -> PluginResult<Option<Vec<u8>>> {
        let Some(path) = self.path_of(url)? else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Resources read from the entries of installed bundles.
///
/// Bundles are searched in the order they were added; the first bundle
/// holding an entry wins. Wrapped bundles are materialized once and the
/// temporary copies live as long as this locator.
#[derive(Debug, Default)]
pub struct BundleResources {
    archives: Mutex<Vec<BundleArchive>>,
}

impl BundleResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a bundle and add it to the search path.
    ///
    /// Adding the same file twice is a no-op.
    pub fn add_bundle<P: AsRef<Path>>(&self, path: P) -> BundleResult<()> {
        let path = path.as_ref();
        let mut archives = self.archives.lock();
        if archives.iter().any(|archive| archive.source() == path) {
            return Ok(());
        }
        archives.push(BundleArchive::open(path)?);
        Ok(())
    }

    /// Paths of the searched bundles, in search order
    pub fn bundles(&self) -> Vec<PathBuf> {
        self.archives
            .lock()
            .iter()
            .map(|archive| archive.source().to_path_buf())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.archives.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.lock().is_empty()
    }
}

impl ResourceLocator for BundleResources {
    fn read_resource(&self, url: &str) -> PluginResult<Option<Vec<u8>>> {
        let Some(entry) = resource_entry(url)? else {
            return Ok(None);
        };

        let mut archives = self.archives.lock();
        for archive in archives.iter_mut() {
            let found = archive.has_file(&entry).map_err(|e| resource_error(archive, e))?;
            if found {
                let bytes = archive
                    .read_file(&entry)
                    .map_err(|e| resource_error(archive, e))?;
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

fn resource_error(archive: &BundleArchive, err: BundleError) -> PluginError {
    PluginError::ResourceError(format!("{}: {err}", archive.source().display()))
}
