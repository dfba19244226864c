//! The `eons-plugin` root descriptor.
//!
//! A root descriptor is a line-oriented text file stored at the top of a
//! bundle. It lists the plug-ins the bundle provides and carries the
//! bundle's catalog id, load priority and descriptive client properties:
//!
//! ```text
//! # Card game rules for My Game
//! id = CATALOGUEID{8a1c7f52-4a8e-4a59-9d1e-2c3f1f4b6a10:2026-3-14-9-26-53-589}
//! priority = GAME
//!
//! name = My Game
//! name_fr = Mon jeu
//! installer = res://mygame/install.js
//!
//! ca.example.MyGame
//! res://mygame/rules.js
//! ```
//!
//! Parsing never fails as a whole: each malformed line is recorded as a
//! [`ParseError`] and parsing continues with the next line.

use crate::archive::BundleArchive;
use crate::{BundleResult, CatalogId, Locale, PluginIdentifier, Priority, ROOT_FILE};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const ID_KEY: &str = "id";
const PRIORITY_KEY: &str = "priority";
const INSTALLER_KEY: &str = "installer";
const CATALOG_PREFIX: &str = "catalog-";

/// Descriptive keys, written in this order after the priority.
const DESCRIPTIVE_KEYS: [&str; 5] = [
    "name",
    "description",
    "image",
    "ui-languages",
    "game-languages",
];

/// Descriptive keys that may be followed by `_lang` or `_lang_COUNTRY`.
const LOCALIZED_KEYS: [&str; 2] = ["name", "description"];

/// Catalog listing keys, written in this order.
const CATALOG_KEYS: [&str; 14] = [
    "catalog-name",
    "catalog-description",
    "catalog-homepage",
    "catalog-tags",
    "catalog-game",
    "catalog-requires",
    "catalog-replaces",
    "catalog-core",
    "catalog-hidden",
    "catalog-ui-languages",
    "catalog-game-languages",
    "catalog-licenses",
    "catalog-minver",
    "catalog-maxver",
];

/// A malformed line in a root descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number where the logical line starts.
    pub line: usize,
    /// Description of the problem.
    pub message: String,
}

/// Which kind of special definition a client property carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialDefinitionKind {
    /// `-Dname = value`: a system definition.
    System,
    /// `-Sname = value`: a default for a setting.
    Setting,
}

impl SpecialDefinitionKind {
    /// Key prefix that marks this kind.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::System => "-D",
            Self::Setting => "-S",
        }
    }
}

/// A `-D` or `-S` client property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialDefinition {
    pub kind: SpecialDefinitionKind,
    /// Key without the `-D`/`-S` prefix.
    pub name: String,
    pub value: String,
}

/// Parsed form of an `eons-plugin` root file.
///
/// Two descriptors are equal when they serialize to the same text.
#[derive(Debug, Clone, Default)]
pub struct RootDescriptor {
    identifiers: Vec<PluginIdentifier>,
    errors: Vec<ParseError>,
    catalog_id: Option<CatalogId>,
    priority: Priority,
    installer: Option<PluginIdentifier>,
    properties: BTreeMap<String, String>,
    comments: Vec<String>,
}

impl RootDescriptor {
    /// Create an empty root descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse root descriptor text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut root = Self::default();
        let lines: Vec<&str> = text.lines().collect();
        let mut seen_entry = false;
        let mut i = 0;

        while i < lines.len() {
            let line_no = i + 1;
            let line = lines[i].trim();
            i += 1;

            if line.is_empty() {
                continue;
            }

            if is_comment(line) {
                if root.catalog_id.is_none()
                    && let Some(id) = CatalogId::extract(line)
                {
                    root.catalog_id = Some(id);
                } else if !seen_entry {
                    root.comments.push(line.to_string());
                }
                continue;
            }

            let mut logical = line.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match next_content_line(&lines, &mut i) {
                    Some(next) => logical.push_str(next),
                    None => break,
                }
            }

            seen_entry = true;
            root.parse_line(line_no, &unescape(&logical));
        }

        root
    }

    /// Read a standalone root file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Read the root descriptor of a bundle, if it has one.
    pub fn from_archive(archive: &mut BundleArchive) -> BundleResult<Option<Self>> {
        if !archive.has_file(ROOT_FILE)? {
            return Ok(None);
        }
        let text = archive.read_file_string(ROOT_FILE)?;
        Ok(Some(Self::parse(&text)))
    }

    /// Replace the root entry of a bundle with this descriptor.
    ///
    /// The bundle keeps its plain or wrapped format. If the rewritten bundle
    /// does not verify, the original is left in place along with a `.bundle`
    /// copy and an error is returned.
    pub fn write_to_archive(&self, archive: &mut BundleArchive) -> BundleResult<()> {
        archive.replace_entry(ROOT_FILE, self.to_string().into_bytes())?;
        debug!(path = %archive.source().display(), "Wrote root descriptor");
        Ok(())
    }

    /// Write this descriptor as a standalone root file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> BundleResult<()> {
        fs::write(path.as_ref(), self.to_string())?;
        Ok(())
    }

    fn parse_line(&mut self, line_no: usize, line: &str) {
        let Some((key, value)) = line.split_once('=') else {
            self.add_parsed_identifier(line_no, line);
            return;
        };

        let key = key.trim();
        let value = value.trim();
        match key {
            ID_KEY => match value.parse::<CatalogId>() {
                Ok(id) => self.catalog_id = Some(id),
                Err(e) => self.error(line_no, e.to_string()),
            },
            PRIORITY_KEY => match value.parse::<Priority>() {
                Ok(priority) => self.priority = priority,
                Err(e) => self.error(line_no, e.to_string()),
            },
            INSTALLER_KEY => match PluginIdentifier::parse(value) {
                Ok(id) => self.installer = Some(id),
                Err(e) => self.error(line_no, e.to_string()),
            },
            "" => self.error(line_no, "missing key before '='".to_string()),
            _ => {
                self.properties.insert(key.to_string(), value.to_string());
            }
        }
    }

    fn add_parsed_identifier(&mut self, line_no: usize, raw: &str) {
        match PluginIdentifier::parse(raw) {
            Ok(id) if self.identifiers.contains(&id) => {
                self.error(line_no, format!("duplicate plug-in identifier {}", id.decorated()));
            }
            Ok(id) => self.identifiers.push(id),
            Err(e) => self.error(line_no, e.to_string()),
        }
    }

    fn error(&mut self, line: usize, message: String) {
        self.errors.push(ParseError { line, message });
    }

    /// Plug-in identifiers, in the order they were listed.
    #[must_use]
    pub fn identifiers(&self) -> &[PluginIdentifier] {
        &self.identifiers
    }

    /// Add a plug-in identifier. Returns `false` if it was already listed.
    pub fn add_identifier(&mut self, id: PluginIdentifier) -> bool {
        if self.identifiers.contains(&id) {
            return false;
        }
        self.identifiers.push(id);
        true
    }

    /// Remove a plug-in identifier. Returns `false` if it was not listed.
    pub fn remove_identifier(&mut self, id: &PluginIdentifier) -> bool {
        let before = self.identifiers.len();
        self.identifiers.retain(|listed| listed != id);
        before != self.identifiers.len()
    }

    /// Replace the identifier list, dropping duplicates.
    pub fn set_identifiers(&mut self, ids: impl IntoIterator<Item = PluginIdentifier>) {
        self.identifiers.clear();
        for id in ids {
            self.add_identifier(id);
        }
    }

    /// Errors found while parsing, in line order.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn catalog_id(&self) -> Option<&CatalogId> {
        self.catalog_id.as_ref()
    }

    pub fn set_catalog_id(&mut self, id: Option<CatalogId>) {
        self.catalog_id = id;
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Script or type run when the bundle is installed.
    #[must_use]
    pub fn installer(&self) -> Option<&PluginIdentifier> {
        self.installer.as_ref()
    }

    pub fn set_installer(&mut self, installer: Option<PluginIdentifier>) {
        self.installer = installer;
    }

    /// Look up a client property.
    #[must_use]
    pub fn client_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Look up a client property for a locale, falling back from
    /// `key_lang_COUNTRY` to `key_lang` to `key`.
    #[must_use]
    pub fn localized_client_property(&self, key: &str, locale: &Locale) -> Option<&str> {
        locale
            .lookup_keys(key)
            .iter()
            .find_map(|candidate| self.client_property(candidate))
    }

    /// Set a client property. The value is stored trimmed.
    ///
    /// Keys that name built-in fields (`id`, `priority`, `installer`) or
    /// contain `=` cannot be client properties and are ignored.
    pub fn set_client_property(&mut self, key: &str, value: &str) {
        let key = key.trim();
        if key.is_empty() || key.contains('=') || is_reserved(key) || is_comment(key) {
            debug!(key, "Ignoring reserved client property key");
            return;
        }
        self.properties.insert(key.to_string(), value.trim().to_string());
    }

    /// Remove a client property, returning its value.
    pub fn remove_client_property(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    /// All client properties, sorted by key.
    #[must_use]
    pub fn client_properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// The `-D` and `-S` client properties.
    #[must_use]
    pub fn special_definitions(&self) -> Vec<SpecialDefinition> {
        self.properties
            .iter()
            .filter_map(|(key, value)| {
                let kind = [SpecialDefinitionKind::System, SpecialDefinitionKind::Setting]
                    .into_iter()
                    .find(|kind| key.starts_with(kind.prefix()))?;
                let name = &key[kind.prefix().len()..];
                if name.is_empty() {
                    return None;
                }
                Some(SpecialDefinition {
                    kind,
                    name: name.to_string(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Leading comment block, one comment per line, markers included.
    #[must_use]
    pub fn comments(&self) -> Option<String> {
        if self.comments.is_empty() {
            None
        } else {
            Some(self.comments.join("\n"))
        }
    }

    /// Replace the leading comment block. Lines without a `#` or `!`
    /// marker get `# ` prepended.
    pub fn set_comments(&mut self, comments: Option<&str>) {
        self.comments = comments
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| {
                        if is_comment(line) {
                            line.to_string()
                        } else {
                            format!("# {line}")
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
    }

    fn serialize(&self) -> String {
        let mut out = String::new();

        for comment in &self.comments {
            out.push_str(comment);
            out.push('\n');
        }
        out.push('\n');

        if let Some(id) = &self.catalog_id {
            write_property(&mut out, ID_KEY, &id.to_string());
        }
        if self.priority != Priority::default() {
            write_property(&mut out, PRIORITY_KEY, &self.priority.to_string());
        }
        out.push('\n');

        let mut written: BTreeSet<&str> = BTreeSet::new();
        for key in DESCRIPTIVE_KEYS {
            if let Some(value) = self.properties.get(key) {
                write_property(&mut out, key, value);
                written.insert(key);
            }
            if LOCALIZED_KEYS.contains(&key) {
                let localized_prefix = format!("{key}_");
                for (k, v) in &self.properties {
                    if k.starts_with(&localized_prefix) {
                        write_property(&mut out, k, v);
                        written.insert(k.as_str());
                    }
                }
            }
        }
        if let Some(installer) = &self.installer {
            write_property(&mut out, INSTALLER_KEY, installer.decorated());
        }
        out.push('\n');

        for (key, value) in &self.properties {
            if !written.contains(key.as_str()) && !key.starts_with(CATALOG_PREFIX) {
                write_property(&mut out, key, value);
            }
        }
        out.push('\n');

        for key in CATALOG_KEYS {
            if let Some(value) = self.properties.get(key) {
                write_property(&mut out, key, value);
            }
        }
        out.push('\n');

        for (key, value) in &self.properties {
            if key.starts_with(CATALOG_PREFIX) && !CATALOG_KEYS.contains(&key.as_str()) {
                write_property(&mut out, key, value);
            }
        }
        out.push('\n');

        for id in &self.identifiers {
            out.push_str(&escape(id.decorated()));
            out.push('\n');
        }

        tidy_blank_lines(&out)
    }
}

impl fmt::Display for RootDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl PartialEq for RootDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for RootDescriptor {}

impl Hash for RootDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state);
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!')
}

fn is_reserved(key: &str) -> bool {
    matches!(key, ID_KEY | PRIORITY_KEY | INSTALLER_KEY)
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn next_content_line<'a>(lines: &[&'a str], i: &mut usize) -> Option<&'a str> {
    while *i < lines.len() {
        let line = lines[*i].trim();
        *i += 1;
        if !line.is_empty() && !is_comment(line) {
            return Some(line);
        }
    }
    None
}

fn write_property(out: &mut String, key: &str, value: &str) {
    out.push_str(&escape(key));
    out.push_str(" = ");
    out.push_str(&escape(value));
    out.push('\n');
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => match decode_unicode_escape(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push('u'),
            },
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Decode the `XXXX` of a `\uXXXX` escape, joining a UTF-16 surrogate pair
/// written as two escapes. Leaves `chars` untouched when nothing decodes.
fn decode_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let high = hex_unit(chars.as_str())?;
    if !(0xD800..0xDC00).contains(&high) {
        let decoded = char::from_u32(high)?;
        chars.nth(3);
        return Some(decoded);
    }

    let rest = chars.as_str().get(4..)?.strip_prefix("\\u")?;
    let low = hex_unit(rest)?;
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    let decoded = char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))?;
    chars.nth(9);
    Some(decoded)
}

fn hex_unit(text: &str) -> Option<u32> {
    let hex = text.get(..4)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Drop leading and trailing blank lines and collapse blank runs to one.
fn tidy_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.trim_start_matches('\n').chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }

    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
