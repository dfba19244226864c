//! Bundle creation utilities.
//!
//! The [`BundleBuilder`] provides a fluent API for creating bundle archives,
//! and the archive encoder shared by the in-place rewrite operations.

use crate::{BundleResult, ROOT_FILE, RootDescriptor, WRAPPED_MAGIC};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builder for creating plug-in bundles.
///
/// # Example
///
/// ```no_run
/// use eons_bundle::{BundleBuilder, RootDescriptor};
///
/// let root = RootDescriptor::parse("mygame/rules.js\n");
/// BundleBuilder::new()
///     .with_root(root)
///     .add_resource("mygame/rules.js", b"function run() {}".to_vec())
///     .wrapped(true)
///     .write("my-game.seplugin")?;
/// # Ok::<(), eons_bundle::BundleError>(())
/// ```
#[derive(Debug, Default)]
pub struct BundleBuilder {
    root: Option<RootDescriptor>,
    files: Vec<Entry>,
    wrapped: bool,
}

/// One entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    /// Path within the archive.
    pub(crate) name: String,
    /// File contents, or `None` for a directory entry.
    pub(crate) contents: Option<Vec<u8>>,
}

impl BundleBuilder {
    /// Create an empty bundle builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root descriptor written as the `eons-plugin` entry.
    #[must_use]
    pub fn with_root(mut self, root: RootDescriptor) -> Self {
        self.root = Some(root);
        self
    }

    /// Add raw bytes as a file in the bundle.
    #[must_use]
    pub fn add_bytes(mut self, archive_path: &str, contents: Vec<u8>) -> Self {
        self.files.push(Entry {
            name: archive_path.to_string(),
            contents: Some(contents),
        });
        self
    }

    /// Add a file under `resources/`, where `res://` identifiers resolve.
    #[must_use]
    pub fn add_resource(self, resource_path: &str, contents: Vec<u8>) -> Self {
        let path = format!("resources/{}", resource_path.trim_start_matches('/'));
        self.add_bytes(&path, contents)
    }

    /// Add a file from disk.
    pub fn add_file<P: AsRef<Path>>(
        self,
        source_path: P,
        archive_path: &str,
    ) -> BundleResult<Self> {
        let contents = fs::read(source_path.as_ref())?;
        Ok(self.add_bytes(archive_path, contents))
    }

    /// Write the archive behind the wrapper magic.
    #[must_use]
    pub fn wrapped(mut self, wrapped: bool) -> Self {
        self.wrapped = wrapped;
        self
    }

    /// Encode the bundle into memory.
    pub fn to_bytes(&self) -> BundleResult<Vec<u8>> {
        let mut entries = Vec::with_capacity(self.files.len() + 1);
        if let Some(root) = &self.root {
            entries.push(Entry {
                name: ROOT_FILE.to_string(),
                contents: Some(root.to_string().into_bytes()),
            });
        }
        entries.extend(self.files.iter().cloned());

        if self.wrapped {
            encode_wrapped(&entries)
        } else {
            encode_archive(&entries, CompressionMethod::Deflated)
        }
    }

    /// Write the bundle to a file.
    pub fn write<P: AsRef<Path>>(self, output_path: P) -> BundleResult<()> {
        let bytes = self.to_bytes()?;
        fs::write(output_path.as_ref(), bytes)?;
        Ok(())
    }
}

/// Encode entries as a zip archive.
pub(crate) fn encode_archive(
    entries: &[Entry],
    method: CompressionMethod,
) -> BundleResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    for entry in entries {
        match &entry.contents {
            Some(contents) => {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(contents)?;
            }
            None => zip.add_directory(entry.name.as_str(), options)?,
        }
    }

    Ok(zip.finish()?.into_inner())
}

/// Encode entries as an uncompressed archive behind the wrapper magic.
pub(crate) fn encode_wrapped(entries: &[Entry]) -> BundleResult<Vec<u8>> {
    let body = encode_archive(entries, CompressionMethod::Stored)?;
    let mut bytes = Vec::with_capacity(WRAPPED_MAGIC.len() + body.len());
    bytes.extend_from_slice(&WRAPPED_MAGIC);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Content digest of every entry, keyed by entry name.
pub(crate) fn entry_digests(entries: &[Entry]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|entry| {
            let digest = match &entry.contents {
                Some(contents) => compute_sha256(contents),
                None => "directory".to_string(),
            };
            (entry.name.clone(), digest)
        })
        .collect()
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}
