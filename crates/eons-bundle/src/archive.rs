//! Bundle archive access.
//!
//! A bundle is a zip archive, optionally preceded by a 4-byte wrapper magic.
//! Wrapped archives are never read in place: [`BundleArchive::materialize`]
//! strips the wrapper into a temporary plain copy that the archive owns and
//! deletes on [`BundleArchive::dispose`] or drop.
//!
//! Operations that rewrite the bundle file build the new content in a
//! temporary file next to the original, read it back, and only then replace
//! the original. When the read-back fails the original is left untouched
//! and a `.bundle` copy of it is kept for recovery.

use crate::builder::{self, Entry};
use crate::{
    BundleError, BundleKind, BundleResult, FormatError, LegacyFormat, PLAIN_MAGIC, RESCUE_SUFFIX,
    WRAPPED_MAGIC,
};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::{CompressionMethod, ZipArchive};

/// How the archive bytes are stored in the bundle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// The file is a zip archive.
    Plain,
    /// The zip archive follows the wrapper magic.
    Wrapped,
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Wrapped => f.write_str("wrapped"),
        }
    }
}

/// Probe the magic number at the start of a file.
pub fn detect_format<P: AsRef<Path>>(path: P) -> BundleResult<ArchiveFormat> {
    let mut header = Vec::with_capacity(8);
    File::open(path.as_ref())?.take(8).read_to_end(&mut header)?;

    if header.len() < 4 {
        return Err(BundleError::InvalidFormat(FormatError::TooShort));
    }

    let magic = &header[..4];
    if magic == PLAIN_MAGIC {
        Ok(ArchiveFormat::Plain)
    } else if magic == WRAPPED_MAGIC {
        if header.len() >= 8 && header[4..8] == WRAPPED_MAGIC {
            Err(BundleError::InvalidFormat(FormatError::DoubleWrapped))
        } else {
            Ok(ArchiveFormat::Wrapped)
        }
    } else if magic == LegacyFormat::Pack200.magic() {
        Err(BundleError::InvalidFormat(FormatError::Obsolete(
            LegacyFormat::Pack200,
        )))
    } else if magic == LegacyFormat::Published.magic() {
        Err(BundleError::InvalidFormat(FormatError::Obsolete(
            LegacyFormat::Published,
        )))
    } else {
        Err(BundleError::InvalidFormat(FormatError::Unrecognized))
    }
}

/// An opened bundle file.
///
/// # Example
///
/// ```no_run
/// use eons_bundle::BundleArchive;
///
/// let mut archive = BundleArchive::open("my-game.seplugin")?;
/// for name in archive.list_files()? {
///     println!("{name}");
/// }
/// archive.dispose();
/// # Ok::<(), eons_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct BundleArchive {
    source: PathBuf,
    format: ArchiveFormat,
    kind: Option<BundleKind>,
    plain_copy: Option<NamedTempFile>,
}

impl BundleArchive {
    /// Open a bundle file, detecting its format.
    pub fn open<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let source = path.as_ref().to_path_buf();
        let format = detect_format(&source)?;
        let kind = BundleKind::from_path(&source);

        debug!(path = %source.display(), %format, "Opened bundle");

        Ok(Self {
            source,
            format,
            kind,
            plain_copy: None,
        })
    }

    /// Kind of a bundle file, from its extension alone.
    #[must_use]
    pub fn kind_of<P: AsRef<Path>>(path: P) -> Option<BundleKind> {
        BundleKind::from_path(path.as_ref())
    }

    /// The bundle file.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The storage format detected when the archive was opened.
    #[must_use]
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// The bundle kind, or `None` when the extension is not a bundle extension.
    #[must_use]
    pub fn kind(&self) -> Option<BundleKind> {
        self.kind
    }

    /// Get a plain archive with the bundle content.
    ///
    /// Plain bundles return the source file; wrapped bundles are unwrapped
    /// into a temporary file once and that copy is reused.
    pub fn materialize(&mut self) -> BundleResult<&Path> {
        if self.format == ArchiveFormat::Plain {
            return Ok(&self.source);
        }

        if self.plain_copy.is_none() {
            let mut source = File::open(&self.source)?;
            source.seek(SeekFrom::Start(WRAPPED_MAGIC.len() as u64))?;

            let mut temp = tempfile::Builder::new()
                .prefix("eons-bundle-")
                .suffix(".zip")
                .tempfile()?;
            io::copy(&mut source, temp.as_file_mut())?;
            temp.as_file_mut().flush()?;

            debug!(
                path = %self.source.display(),
                copy = %temp.path().display(),
                "Materialized wrapped bundle"
            );
            self.plain_copy = Some(temp);
        }

        match &self.plain_copy {
            Some(temp) => Ok(temp.path()),
            None => Err(BundleError::MissingFile(format!(
                "plain copy of {}",
                self.source.display()
            ))),
        }
    }

    /// Delete the materialized plain copy, if one was made.
    pub fn dispose(&mut self) {
        if let Some(temp) = self.plain_copy.take() {
            let path = temp.path().to_path_buf();
            if let Err(e) = temp.close() {
                warn!(path = %path.display(), error = %e, "Failed to delete plain bundle copy");
            }
        }
    }

    /// Open the plain content as a zip archive.
    pub fn zip(&mut self) -> BundleResult<ZipArchive<File>> {
        let file = File::open(self.materialize()?)?;
        Ok(ZipArchive::new(file)?)
    }

    /// List all entries in the bundle.
    pub fn list_files(&mut self) -> BundleResult<Vec<String>> {
        let archive = self.zip()?;
        Ok((0..archive.len())
            .filter_map(|i| archive.name_for_index(i).map(String::from))
            .collect())
    }

    /// Check if an entry exists in the bundle.
    pub fn has_file(&mut self, path: &str) -> BundleResult<bool> {
        Ok(self.zip()?.index_for_name(path).is_some())
    }

    /// Read an entry as bytes.
    pub fn read_file(&mut self, path: &str) -> BundleResult<Vec<u8>> {
        let mut archive = self.zip()?;
        let mut file = archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in bundle: {path}")))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read an entry as a UTF-8 string.
    pub fn read_file_string(&mut self, path: &str) -> BundleResult<String> {
        let mut archive = self.zip()?;
        let mut file = archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in bundle: {path}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// SHA-256 of every entry, keyed by entry name.
    pub fn digests(&mut self) -> BundleResult<BTreeMap<String, String>> {
        Ok(builder::entry_digests(&self.read_entries()?))
    }

    /// Copy the bundle content to `dest` as a plain archive.
    ///
    /// Copying a bundle onto itself unwraps it in place.
    pub fn copy_to<P: AsRef<Path>>(&mut self, dest: P) -> BundleResult<()> {
        let dest = dest.as_ref();
        if is_same_file(&self.source, dest) {
            return self.unwrap_in_place();
        }

        let plain = self.materialize()?.to_path_buf();
        fs::copy(&plain, dest)?;
        debug!(from = %self.source.display(), to = %dest.display(), "Copied bundle");
        Ok(())
    }

    /// Replace the bundle file with a wrapped, uncompressed re-encoding of
    /// its content.
    pub fn wrap_in_place(&mut self) -> BundleResult<()> {
        let entries = self.read_entries()?;
        let bytes = builder::encode_wrapped(&entries)?;
        self.replace_verified(&bytes, ArchiveFormat::Wrapped, &builder::entry_digests(&entries))
    }

    /// Replace (or add) a single entry, keeping the bundle's format.
    pub fn replace_entry(&mut self, name: &str, contents: Vec<u8>) -> BundleResult<()> {
        let mut entries = self.read_entries()?;
        match entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.contents = Some(contents),
            None => entries.push(Entry {
                name: name.to_string(),
                contents: Some(contents),
            }),
        }

        let bytes = match self.format {
            ArchiveFormat::Plain => builder::encode_archive(&entries, CompressionMethod::Deflated)?,
            ArchiveFormat::Wrapped => builder::encode_wrapped(&entries)?,
        };
        self.replace_verified(&bytes, self.format, &builder::entry_digests(&entries))
    }

    fn unwrap_in_place(&mut self) -> BundleResult<()> {
        if self.format == ArchiveFormat::Plain {
            return Ok(());
        }

        let expected = self.digests()?;
        let bytes = fs::read(self.materialize()?)?;
        self.replace_verified(&bytes, ArchiveFormat::Plain, &expected)
    }

    pub(crate) fn read_entries(&mut self) -> BundleResult<Vec<Entry>> {
        let mut archive = self.zip()?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            if file.is_dir() {
                entries.push(Entry {
                    name,
                    contents: None,
                });
            } else {
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                entries.push(Entry {
                    name,
                    contents: Some(contents),
                });
            }
        }

        Ok(entries)
    }

    /// Write `bytes` to a temp file beside the bundle, verify that it reads
    /// back with the expected format and entries, then move it over the
    /// bundle.
    fn replace_verified(
        &mut self,
        bytes: &[u8],
        format: ArchiveFormat,
        expected: &BTreeMap<String, String>,
    ) -> BundleResult<()> {
        let dir = match self.source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".eons-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        if let Err(reason) = verify(temp.path(), format, expected) {
            let rescue = rescue_path(&self.source);
            fs::copy(&self.source, &rescue)?;
            warn!(
                path = %self.source.display(),
                rescue = %rescue.display(),
                %reason,
                "Rewritten bundle failed verification"
            );
            return Err(BundleError::VerificationFailed {
                path: self.source.clone(),
                rescue,
                reason,
            });
        }

        temp.persist(&self.source).map_err(|e| e.error)?;
        self.dispose();
        self.format = format;

        debug!(path = %self.source.display(), %format, "Replaced bundle");
        Ok(())
    }
}

impl Drop for BundleArchive {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn verify(
    path: &Path,
    format: ArchiveFormat,
    expected: &BTreeMap<String, String>,
) -> Result<(), String> {
    let mut reopened = BundleArchive::open(path).map_err(|e| e.to_string())?;
    if reopened.format() != format {
        return Err(format!(
            "expected a {format} archive, found {}",
            reopened.format()
        ));
    }

    let digests = reopened.digests().map_err(|e| e.to_string())?;
    if &digests != expected {
        return Err("archive entries differ from the original".to_string());
    }
    Ok(())
}

/// Path of the rescue copy kept when rewriting `path` fails.
#[must_use]
pub fn rescue_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(RESCUE_SUFFIX);
    PathBuf::from(name)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[path = "archive/archive_tests.rs"]
mod archive_tests;
