//! Plug-in identifier normalization.
//!
//! Root files and the registry accept identifiers in several spellings:
//! dotted type names, class-file paths, script paths and resource URLs.
//! [`PluginIdentifier::parse`] reduces all of them to one canonical form:
//!
//! ```text
//! ca/example/Foo.class        -> ca.example.Foo
//! class:ca.example.Foo        -> ca.example.Foo
//! mygame/rules.js             -> script:res://mygame/rules.js
//! /resources/mygame/rules.js  -> script:res://mygame/rules.js
//! /other/rules.js             -> script:res:///other/rules.js
//! res://mygame/rules.js       -> script:res://mygame/rules.js
//! ```

use std::fmt;
use thiserror::Error;

/// Prefix that marks a script identifier.
pub const SCRIPT_PREFIX: &str = "script:";

/// Prefix that marks a native type identifier.
pub const CLASS_PREFIX: &str = "class:";

/// Prefix of resource URLs.
pub const RESOURCE_PREFIX: &str = "res:";

const RESOURCE_ROOT: &str = "res://";
const RESOURCES_DIR: &str = "resources/";
const SCRIPT_EXTENSION: &str = ".js";
const COMPILED_SUFFIX: &str = ".class";
const SOURCE_SUFFIX: &str = ".java";

/// A malformed plug-in identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier \"{identifier}\": {reason}")]
pub struct IdentifierError {
    /// The identifier as it was supplied.
    pub identifier: String,
    /// The character that made the identifier illegal, if any.
    pub character: Option<char>,
    /// Human-readable description of the problem.
    pub reason: String,
}

impl IdentifierError {
    fn new(identifier: &str, character: Option<char>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.to_string(),
            character,
            reason: reason.into(),
        }
    }
}

/// A normalized plug-in identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginIdentifier {
    /// A native plug-in, named by its dotted type name.
    Native(String),
    /// A scripted plug-in, named by its resource URL (`res://...` or `res:///...`).
    Script(String),
}

impl PluginIdentifier {
    /// Parse and normalize a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(IdentifierError::new(raw, None, "identifier is empty"));
        }

        if is_script(id) {
            Ok(Self::Script(canonical_script_url(id)))
        } else {
            canonical_type_name(id).map(Self::Native)
        }
    }

    /// Check if this identifies a scripted plug-in.
    #[must_use]
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script(_))
    }

    /// The identifier without the script marker, for display and root files.
    #[must_use]
    pub fn decorated(&self) -> &str {
        match self {
            Self::Native(name) => name,
            Self::Script(url) => url,
        }
    }

    /// Last component of the identifier, without a script extension.
    ///
    /// Used as a fallback display name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        match self {
            Self::Native(name) => name.rsplit('.').next().unwrap_or(name),
            Self::Script(url) => {
                let file = url.rsplit('/').next().unwrap_or(url);
                file.strip_suffix(SCRIPT_EXTENSION).unwrap_or(file)
            }
        }
    }
}

impl fmt::Display for PluginIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(name) => write!(f, "{name}"),
            Self::Script(url) => write!(f, "{SCRIPT_PREFIX}{url}"),
        }
    }
}

impl std::str::FromStr for PluginIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convert a raw identifier into its canonical string form.
pub fn normalize(raw: &str) -> Result<String, IdentifierError> {
    PluginIdentifier::parse(raw).map(|id| id.to_string())
}

/// Strip the script marker from a normalized identifier for display.
///
/// Scripts stay recognizable because they still start with `res:`.
#[must_use]
pub fn decorate(normalized: &str) -> &str {
    normalized.strip_prefix(SCRIPT_PREFIX).unwrap_or(normalized)
}

fn is_script(id: &str) -> bool {
    id.starts_with(SCRIPT_PREFIX)
        || (id.ends_with(SCRIPT_EXTENSION) && !id.starts_with(CLASS_PREFIX))
        || id.starts_with(RESOURCE_PREFIX)
}

fn canonical_script_url(id: &str) -> String {
    let path = id.strip_prefix(SCRIPT_PREFIX).unwrap_or(id).trim();
    // covers both res:// and res:///
    if path.starts_with(RESOURCE_ROOT) {
        return path.to_string();
    }

    let path = path.strip_prefix(RESOURCE_PREFIX).unwrap_or(path);
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let relative = path.trim_start_matches('/');

    if let Some(rest) = relative.strip_prefix(RESOURCES_DIR) {
        format!("{RESOURCE_ROOT}{rest}")
    } else if absolute {
        format!("{RESOURCE_ROOT}/{relative}")
    } else {
        format!("{RESOURCE_ROOT}{relative}")
    }
}

fn canonical_type_name(id: &str) -> Result<String, IdentifierError> {
    let name = id.strip_prefix(CLASS_PREFIX).unwrap_or(id).trim();
    let is_path = name.contains(['/', '\\']);

    let name = match name.strip_suffix(COMPILED_SUFFIX) {
        Some(stripped) => stripped,
        None if is_path => name.strip_suffix(SOURCE_SUFFIX).unwrap_or(name),
        None => name,
    };

    let name: String = name
        .trim_start_matches(['/', '\\'])
        .chars()
        .map(|c| if c == '/' || c == '\\' { '.' } else { c })
        .collect();

    for segment in name.split('.') {
        validate_segment(id, segment)?;
    }

    // keep the marker where the bare name would read back as a script
    if name.ends_with(SCRIPT_EXTENSION) {
        Ok(format!("{CLASS_PREFIX}{name}"))
    } else {
        Ok(name)
    }
}

fn validate_segment(id: &str, segment: &str) -> Result<(), IdentifierError> {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return Err(IdentifierError::new(id, None, "empty name segment"));
    };

    if !is_identifier_start(first) {
        return Err(IdentifierError::new(
            id,
            Some(first),
            format!("'{first}' cannot start a name segment"),
        ));
    }

    if let Some(bad) = chars.find(|&c| !is_identifier_part(c)) {
        return Err(IdentifierError::new(
            id,
            Some(bad),
            format!("'{bad}' is not allowed in a name segment"),
        ));
    }

    // a trailing .class is always stripped, so it can never be a segment
    if segment == "class" {
        return Err(IdentifierError::new(id, None, "'class' is a reserved word"));
    }

    Ok(())
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
