//! Commands that rewrite bundles: unwrap, wrap and stamp

use anyhow::{Context, Result};
use eons_bundle::{ArchiveFormat, BundleArchive, CatalogId, RootDescriptor};
use std::io::Write;
use std::path::Path;

/// Store a bundle as a plain archive, in place or at `output`.
pub fn unwrap<W: Write>(bundle: &Path, output: Option<&Path>, out: &mut W) -> Result<()> {
    let mut archive = open(bundle)?;
    let dest = output.unwrap_or(bundle);

    if archive.format() == ArchiveFormat::Plain && dest == bundle {
        writeln!(out, "{} is already plain", bundle.display())?;
        return Ok(());
    }

    archive
        .copy_to(dest)
        .with_context(|| format!("Failed to unwrap {} to {}", bundle.display(), dest.display()))?;
    archive.dispose();

    writeln!(out, "Unwrapped: {}", dest.display())?;
    Ok(())
}

/// Re-encode a bundle behind the wrapper magic.
pub fn wrap<W: Write>(bundle: &Path, out: &mut W) -> Result<()> {
    let mut archive = open(bundle)?;
    if archive.format() == ArchiveFormat::Wrapped {
        writeln!(out, "{} is already wrapped", bundle.display())?;
        return Ok(());
    }

    archive
        .wrap_in_place()
        .with_context(|| format!("Failed to wrap {}", bundle.display()))?;
    archive.dispose();

    writeln!(out, "Wrapped: {}", bundle.display())?;
    Ok(())
}

/// Update the catalog timestamp of a bundle, keeping its UUID.
///
/// A bundle without a catalog id gets a new one.
pub fn stamp<W: Write>(bundle: &Path, out: &mut W) -> Result<()> {
    let mut archive = open(bundle)?;
    let mut root = RootDescriptor::from_archive(&mut archive)
        .with_context(|| format!("Failed to read root file of {}", bundle.display()))?
        .with_context(|| format!("{} has no root file", bundle.display()))?;

    let id = match root.catalog_id() {
        Some(existing) => existing.updated(),
        None => CatalogId::new(),
    };
    root.set_catalog_id(Some(id));
    root.write_to_archive(&mut archive)
        .with_context(|| format!("Failed to update {}", bundle.display()))?;
    archive.dispose();

    writeln!(out, "Stamped {}: {id}", bundle.display())?;
    Ok(())
}

fn open(bundle: &Path) -> Result<BundleArchive> {
    BundleArchive::open(bundle).with_context(|| format!("Failed to open: {}", bundle.display()))
}
