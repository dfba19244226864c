//! eons-host - Installed bundles and plug-in lifecycle
//!
//! This crate runs the plug-ins that discovery finds:
//! - [`discover`] scans plug-in directories and creates an
//!   [`InstalledBundleObject`] per library, theme, extension or plug-in
//! - [`PluginLifecycle`] starts, probes and stops one plug-in, recording
//!   failures in the shared [`FailureTracker`](eons_core::FailureTracker)
//! - [`PluginRegistry`] maps identifiers to native factories or scripts
//! - [`PluginHost`] runs the boot sequence and shutdown
//!
//! # Example
//!
//! ```no_run
//! use eons_host::{HostConfig, PluginHost};
//! use eons_core::ActivationModifiers;
//!
//! let host = PluginHost::new(HostConfig::from_file("eons.toml")?)?;
//! let (report, errors) = host.boot()?;
//! for skipped in &report.skipped {
//!     eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
//! }
//! for object in host.objects() {
//!     println!("{:<12} {}", object.kind(), object.name());
//! }
//! # let _ = (errors, ActivationModifiers::NONE);
//! # Ok::<(), eons_host::HostError>(())
//! ```

mod config;
mod discovery;
mod error;
mod host;
mod installed;
mod lifecycle;
mod panic_guard;
mod registry;
mod resources;
mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::HostConfig;
pub use discovery::{DiscoveryReport, SkippedBundle, discover};
pub use error::{HostError, HostResult, LifecycleError};
pub use host::PluginHost;
pub use installed::{Bundle, InstalledBundleObject, Metadata, sort_objects};
pub use lifecycle::{PluginInfo, PluginLifecycle};
pub use registry::{NativeFactory, PluginRegistry};
pub use resources::{BundleResources, DirectoryResources, resource_entry};
pub use services::PluginServices;
