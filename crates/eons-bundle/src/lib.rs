//! Plug-in bundle format for the eons plug-in host
//!
//! This crate provides the on-disk side of the plug-in subsystem:
//! - [`BundleArchive`] opens `.selibrary`, `.setheme`, `.seext` and `.seplugin`
//!   bundles, detecting plain and wrapped archives
//! - [`RootDescriptor`] parses and writes the `eons-plugin` root file
//! - [`PluginIdentifier`] normalizes the identifiers listed in root files
//!
//! # Bundle Structure
//!
//! ```text
//! my-game.seplugin
//! ├── [07 88 53 45]              # optional wrapper magic
//! └── zip archive
//!     ├── eons-plugin            # root descriptor
//!     ├── resources/
//!     │   └── mygame/
//!     │       └── rules.js       # script:res://mygame/rules.js
//!     └── ...
//! ```
//!
//! # Example
//!
//! ```no_run
//! use eons_bundle::{BundleArchive, RootDescriptor};
//!
//! let mut archive = BundleArchive::open("my-game.seplugin")?;
//! if let Some(root) = RootDescriptor::from_archive(&mut archive)? {
//!     for id in root.identifiers() {
//!         println!("{}", id.decorated());
//!     }
//! }
//! # Ok::<(), eons_bundle::BundleError>(())
//! ```

mod catalog;
mod error;
mod kind;
mod locale;
mod priority;

pub mod archive;
pub mod builder;
pub mod identifier;
pub mod root;

pub use archive::{ArchiveFormat, BundleArchive};
pub use builder::BundleBuilder;
pub use catalog::{CatalogId, CatalogStamp};
pub use error::{BundleError, FormatError, LegacyFormat};
pub use identifier::{IdentifierError, PluginIdentifier, decorate, normalize};
pub use kind::BundleKind;
pub use locale::Locale;
pub use priority::Priority;
pub use root::{ParseError, RootDescriptor, SpecialDefinition, SpecialDefinitionKind};

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Name of the root descriptor entry within a bundle archive.
pub const ROOT_FILE: &str = "eons-plugin";

/// Magic number at the start of every plain (zip) archive.
pub const PLAIN_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Magic number prefixed to wrapped archives.
pub const WRAPPED_MAGIC: [u8; 4] = [0x07, 0x88, 0x53, 0x45];

/// Suffix appended to rescue and rollback copies of a bundle.
pub const RESCUE_SUFFIX: &str = ".bundle";
