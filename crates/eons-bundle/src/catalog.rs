//! Catalog ids: the uuid + timestamp token that identifies a bundle release.

use crate::BundleError;
use chrono::{Datelike, Timelike, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const TOKEN_START: &str = "CATALOGUEID{";
const TOKEN_END: char = '}';

/// Release timestamp carried by a catalog id.
///
/// Fields compare in declaration order, so the derived ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogStamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millis: u32,
}

impl CatalogStamp {
    /// The current UTC time.
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            millis: now.timestamp_subsec_millis().min(999),
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('-').map(str::trim);
        let year = parts.next()?.parse().ok()?;
        let mut next = || -> Option<u32> { parts.next()?.parse().ok() };
        let stamp = Self {
            year,
            month: next()?,
            day: next()?,
            hour: next()?,
            minute: next()?,
            second: next()?,
            millis: next()?,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(stamp)
    }
}

impl fmt::Display for CatalogStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}-{}-{}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millis
        )
    }
}

/// Identifies one release of a bundle.
///
/// The uuid is stable across releases of the same bundle; the stamp
/// tells releases apart.
///
/// ```
/// use eons_bundle::CatalogId;
///
/// let id: CatalogId = "CATALOGUEID{8b3c7c4e-0f3a-4a57-9a0e-0c0f9d1b2a11:2024-3-9-12-0-0-0}"
///     .parse()?;
/// let next = id.updated();
///
/// assert_eq!(id.uuid(), next.uuid());
/// # Ok::<(), eons_bundle::BundleError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogId {
    uuid: Uuid,
    stamp: CatalogStamp,
}

impl CatalogId {
    /// Create an id for a brand new bundle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            stamp: CatalogStamp::now(),
        }
    }

    /// Create an id from its parts.
    #[must_use]
    pub fn from_parts(uuid: Uuid, stamp: CatalogStamp) -> Self {
        Self { uuid, stamp }
    }

    /// An id for a new release of the same bundle.
    #[must_use]
    pub fn updated(&self) -> Self {
        Self {
            uuid: self.uuid,
            stamp: CatalogStamp::now(),
        }
    }

    /// The bundle uuid.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The release stamp.
    #[must_use]
    pub fn stamp(&self) -> CatalogStamp {
        self.stamp
    }

    /// Check if this release was stamped after `other`.
    #[must_use]
    pub fn is_newer_than(&self, other: &CatalogId) -> bool {
        self.stamp > other.stamp
    }

    /// Order more recent releases first.
    #[must_use]
    pub fn cmp_recency(&self, other: &CatalogId) -> Ordering {
        other.stamp.cmp(&self.stamp)
    }

    /// Find a catalog id token anywhere in a line of text.
    #[must_use]
    pub fn extract(text: &str) -> Option<Self> {
        let start = text.find(TOKEN_START)?;
        let rest = &text[start..];
        let end = rest.find(TOKEN_END)?;
        rest[..=end].parse().ok()
    }
}

impl Default for CatalogId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for CatalogId {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BundleError::InvalidCatalogId(s.to_string());

        let body = s
            .trim()
            .strip_prefix(TOKEN_START)
            .and_then(|rest| rest.strip_suffix(TOKEN_END))
            .ok_or_else(invalid)?;
        let (uuid, stamp) = body.split_once(':').ok_or_else(invalid)?;

        let uuid = Uuid::parse_str(uuid.trim()).map_err(|_| invalid())?;
        let stamp = CatalogStamp::parse(stamp).ok_or_else(invalid)?;
        Ok(Self { uuid, stamp })
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TOKEN_START}{}:{}{TOKEN_END}", self.uuid, self.stamp)
    }
}
