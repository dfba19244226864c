//! Images supplied by plug-ins and bundles

use crate::{PluginResult, ResourceLocator};
use std::fmt;
use std::sync::Arc;

/// Encoded image data and the resource it was read from.
///
/// Decoding is left to the front end; the host only moves bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    source: String,
    bytes: Arc<[u8]>,
}

impl Image {
    pub fn new(source: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source: source.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an image through a resource locator.
    ///
    /// Returns `Ok(None)` when the locator has no such resource.
    pub fn load(locator: &dyn ResourceLocator, url: &str) -> PluginResult<Option<Self>> {
        Ok(locator
            .read_resource(url)?
            .map(|bytes| Self::new(url, bytes)))
    }

    /// Resource url or path the image came from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("source", &self.source)
            .field("len", &self.bytes.len())
            .finish()
    }
}
