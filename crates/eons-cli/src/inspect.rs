//! Read-only commands: inspect, check and normalize

use anyhow::{Context, Result};
use eons_bundle::{BundleArchive, RootDescriptor, normalize as normalize_id};
use std::io::Write;
use std::path::Path;

/// Describe a bundle file.
pub fn inspect<W: Write>(bundle: &Path, out: &mut W) -> Result<()> {
    let mut archive = BundleArchive::open(bundle)
        .with_context(|| format!("Failed to open: {}", bundle.display()))?;

    writeln!(out, "Bundle: {}", bundle.display())?;
    match archive.kind() {
        Some(kind) => writeln!(out, "Kind: {kind}")?,
        None => writeln!(out, "Kind: unknown (not a bundle extension)")?,
    }
    writeln!(out, "Format: {}", archive.format())?;

    let files = archive
        .list_files()
        .with_context(|| format!("Failed to read: {}", bundle.display()))?;
    writeln!(out, "\nFiles:")?;
    for file in &files {
        writeln!(out, "  {file}")?;
    }

    let root = RootDescriptor::from_archive(&mut archive)
        .with_context(|| format!("Failed to read root file of {}", bundle.display()))?;
    archive.dispose();

    match root {
        Some(root) => {
            writeln!(out)?;
            describe_root(&root, out)?;
        }
        None => writeln!(out, "\nNo root file")?,
    }
    Ok(())
}

/// Parse a root file and report every problem.
///
/// Fails when the file has parse errors.
pub fn check<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let root = RootDescriptor::from_file(path)
        .with_context(|| format!("Failed to read root file: {}", path.display()))?;

    describe_root(&root, out)?;

    if root.has_errors() {
        anyhow::bail!(
            "{} has {} error(s)",
            path.display(),
            root.errors().len()
        );
    }
    writeln!(out, "\n{} is valid", path.display())?;
    Ok(())
}

/// Print `raw -> canonical` for each identifier.
///
/// Every identifier is tried; the command fails afterwards if any was invalid.
pub fn normalize<W: Write>(identifiers: &[String], out: &mut W) -> Result<()> {
    let mut invalid = 0;
    for raw in identifiers {
        match normalize_id(raw) {
            Ok(canonical) => writeln!(out, "{raw} -> {canonical}")?,
            Err(err) => {
                invalid += 1;
                writeln!(out, "{raw} -> error: {}", err.reason)?;
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} invalid identifier(s)");
    }
    Ok(())
}

fn describe_root<W: Write>(root: &RootDescriptor, out: &mut W) -> Result<()> {
    match root.catalog_id() {
        Some(id) => writeln!(out, "Catalog id: {id}")?,
        None => writeln!(out, "Catalog id: none")?,
    }
    writeln!(out, "Priority: {}", root.priority())?;
    if let Some(installer) = root.installer() {
        writeln!(out, "Installer: {}", installer.decorated())?;
    }

    writeln!(out, "Plug-ins:")?;
    if root.identifiers().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for id in root.identifiers() {
        writeln!(out, "  {id}")?;
    }

    if !root.client_properties().is_empty() {
        writeln!(out, "Properties:")?;
        for (key, value) in root.client_properties() {
            writeln!(out, "  {key} = {value}")?;
        }
    }

    let definitions = root.special_definitions();
    if !definitions.is_empty() {
        writeln!(out, "Definitions:")?;
        for definition in &definitions {
            writeln!(
                out,
                "  {}{} = {}",
                definition.kind.prefix(),
                definition.name,
                definition.value
            )?;
        }
    }

    if root.has_errors() {
        writeln!(out, "Errors:")?;
        for error in root.errors() {
            writeln!(out, "  {error}")?;
        }
    }
    Ok(())
}
