//! Bundle kinds, derived from the bundle file extension.

use std::fmt;
use std::path::Path;

/// The kind of content a bundle distributes.
///
/// The declaration order is the install and display order: libraries
/// first, plug-ins last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BundleKind {
    /// Shared code and resources used by other bundles (`.selibrary`).
    Library,
    /// A user interface theme (`.setheme`).
    Theme,
    /// Plug-ins started once at application boot (`.seext`).
    Extension,
    /// Activated or injected plug-ins (`.seplugin`).
    Plugin,
}

impl BundleKind {
    /// All kinds, in rank order.
    pub const ALL: [BundleKind; 4] = [Self::Library, Self::Theme, Self::Extension, Self::Plugin];

    /// Get the file extension (without the dot) for this kind.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Library => "selibrary",
            Self::Theme => "setheme",
            Self::Extension => "seext",
            Self::Plugin => "seplugin",
        }
    }

    /// Get the kind name (e.g., "library").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Theme => "theme",
            Self::Extension => "extension",
            Self::Plugin => "plugin",
        }
    }

    /// Sort rank; lower ranks are installed and listed first.
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Match a file extension, ignoring case.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(extension))
    }

    /// Determine the kind of a bundle file from its name alone.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Check if bundles of this kind carry startable plug-ins.
    #[must_use]
    pub fn has_plugins(&self) -> bool {
        matches!(self, Self::Extension | Self::Plugin)
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
