//! eons CLI - Bundle maintenance tool
//!
//! Commands:
//! - `eons inspect` - Show the format, files and root descriptor of a bundle
//! - `eons check` - Validate a standalone root file
//! - `eons normalize` - Print the canonical form of plug-in identifiers
//! - `eons unwrap` - Store a bundle as a plain archive
//! - `eons wrap` - Store a bundle behind the wrapper magic
//! - `eons stamp` - Give a bundle a fresh catalog timestamp
//! - `eons scan` - List the installed objects found in plug-in directories

use anyhow::Context;
use clap::{Parser, Subcommand};
use eons_core::LogLevel;
use eons_host::HostConfig;
use eons_logging::ReloadHandle;
use std::path::PathBuf;

mod inspect;
mod rewrite;
mod scan;

#[derive(Parser)]
#[command(name = "eons")]
#[command(author, version, about = "Maintenance tool for eons plug-in bundles", long_about = None)]
struct Cli {
    /// Host configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the format, files and root descriptor of a bundle
    Inspect {
        /// Bundle file (.selibrary, .setheme, .seext or .seplugin)
        bundle: PathBuf,
    },

    /// Validate a standalone root file
    Check {
        /// Root file to parse
        root: PathBuf,
    },

    /// Print the canonical form of plug-in identifiers
    Normalize {
        /// Identifiers as they would appear in a root file
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Store a bundle as a plain archive
    Unwrap {
        bundle: PathBuf,

        /// Write the plain archive here instead of replacing the bundle
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a bundle behind the wrapper magic
    Wrap { bundle: PathBuf },

    /// Give a bundle a fresh catalog timestamp, creating a catalog id if needed
    Stamp { bundle: PathBuf },

    /// List the installed objects found in plug-in directories
    Scan {
        /// Directory to scan (repeatable; adds to the configured directories)
        #[arg(short, long = "dir")]
        dirs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    eons_logging::init_logging(level);

    let config = match &cli.config {
        Some(path) => HostConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => HostConfig::default(),
    };
    if cli.config.is_some() && !cli.verbose {
        level = config.log_level();
        ReloadHandle::global()
            .reload_level(level)
            .map_err(anyhow::Error::msg)
            .context("Failed to apply the configured log level")?;
    }
    tracing::debug!(%level, config = ?cli.config, "Logging initialized");

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Inspect { bundle } => inspect::inspect(&bundle, &mut out)?,
        Commands::Check { root } => inspect::check(&root, &mut out)?,
        Commands::Normalize { identifiers } => inspect::normalize(&identifiers, &mut out)?,
        Commands::Unwrap { bundle, output } => {
            rewrite::unwrap(&bundle, output.as_deref(), &mut out)?
        }
        Commands::Wrap { bundle } => rewrite::wrap(&bundle, &mut out)?,
        Commands::Stamp { bundle } => rewrite::stamp(&bundle, &mut out)?,
        Commands::Scan { dirs } => scan::run(config, dirs, &mut out)?,
    }

    Ok(())
}
