//! Scan command

use anyhow::{Context, Result};
use eons_host::{HostConfig, PluginHost};
use std::io::Write;
use std::path::PathBuf;

/// Discover the bundles in the configured directories plus `dirs`.
///
/// Plug-ins are listed but never started.
pub fn run<W: Write>(mut config: HostConfig, dirs: Vec<PathBuf>, out: &mut W) -> Result<()> {
    config.plugin_dirs.extend(dirs);
    if config.plugin_dirs.is_empty() {
        anyhow::bail!("No plug-in directories given; use --dir or a config file");
    }

    let locale = config.locale();
    let host = PluginHost::new(config).context("Failed to create plug-in host")?;
    let report = host.discover().context("Discovery failed")?;

    writeln!(out, "Installed objects: {}", report.objects.len())?;
    for object in &report.objects {
        let title = object
            .root()
            .and_then(|root| root.localized_client_property("name", &locale))
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<9} {:>9}  {}{title}",
            object.kind().as_str(),
            object.priority().to_string(),
            object.label()
        )?;
        writeln!(out, "            {}", object.path().display())?;
    }

    if !report.skipped.is_empty() {
        writeln!(out, "\nSkipped:")?;
        for skipped in &report.skipped {
            writeln!(out, "  {}: {}", skipped.path.display(), skipped.reason)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use eons_bundle::{BundleBuilder, RootDescriptor};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn run___directory_with_bundles___lists_objects_and_skips() {
        let temp_dir = TempDir::new().unwrap();
        BundleBuilder::new()
            .with_root(RootDescriptor::parse("name = Dice Game\npriority = GAME\ndice/rules.js\n"))
            .wrapped(true)
            .write(temp_dir.path().join("dice.seplugin"))
            .unwrap();
        fs::write(temp_dir.path().join("broken.seext"), b"nope").unwrap();

        let mut out = Vec::new();
        run(HostConfig::default(), vec![temp_dir.path().to_path_buf()], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Installed objects: 1"), "{text}");
        assert!(text.contains("res://dice/rules.js (Dice Game)"), "{text}");
        assert!(text.contains("GAME"), "{text}");
        assert!(text.contains("broken.seext"), "{text}");
    }

    #[test]
    fn run___no_directories___returns_error() {
        let err = run(HostConfig::default(), Vec::new(), &mut Vec::new()).unwrap_err();

        assert!(err.to_string().contains("No plug-in directories"));
    }
}
