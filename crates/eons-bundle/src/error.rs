//! Error types for bundle operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during bundle operations.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The file is not a bundle this host can read.
    #[error("Invalid bundle format: {0}")]
    InvalidFormat(FormatError),

    /// Malformed plug-in identifier.
    #[error(transparent)]
    InvalidIdentifier(#[from] crate::IdentifierError),

    /// Malformed catalog id token.
    #[error("Invalid catalog id: {0}")]
    InvalidCatalogId(String),

    /// Malformed priority value.
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    /// Missing required file in bundle.
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// A rewritten bundle did not read back correctly; the original
    /// content was preserved at `rescue`.
    #[error("Verification of {path} failed ({reason}); a copy was left at {rescue}")]
    VerificationFailed {
        path: PathBuf,
        rescue: PathBuf,
        reason: String,
    },
}

/// Why the magic-number probe rejected a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Fewer bytes than a magic number.
    TooShort,
    /// Neither a plain nor a wrapped archive.
    Unrecognized,
    /// A wrapper header follows another wrapper header.
    DoubleWrapped,
    /// A format older versions of the host wrote but this one cannot read.
    Obsolete(LegacyFormat),
}

/// Bundle encodings that are recognized only to be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFormat {
    /// Pack200-compressed bundle.
    Pack200,
    /// Published (pack200 + compressed stream) bundle.
    Published,
}

impl LegacyFormat {
    /// Magic number that identifies this format.
    #[must_use]
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Self::Pack200 => [0xCA, 0xFE, 0xD0, 0x0D],
            Self::Published => [0x07, 0x88, 0x53, 0x50],
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "file is too short to be a bundle"),
            Self::Unrecognized => write!(f, "unrecognized magic number"),
            Self::DoubleWrapped => write!(f, "bundle is wrapped more than once"),
            Self::Obsolete(LegacyFormat::Pack200) => write!(
                f,
                "obsolete Pack200 bundle format; download a current version of this bundle"
            ),
            Self::Obsolete(LegacyFormat::Published) => write!(
                f,
                "obsolete published bundle format; download a current version of this bundle"
            ),
        }
    }
}
