//! Resource lookup for scripts, images and other bundle content

use crate::{PluginError, PluginResult};

/// Turns a resource url into bytes.
///
/// Urls use the `res://` scheme: `res://path` names `resources/path`
/// inside a bundle, `res:///path` names `path` relative to the bundle root.
pub trait ResourceLocator: Send + Sync {
    /// Read a resource. Returns `Ok(None)` when it does not exist.
    fn read_resource(&self, url: &str) -> PluginResult<Option<Vec<u8>>>;

    /// Read a resource as UTF-8 text.
    fn read_text(&self, url: &str) -> PluginResult<Option<String>> {
        match self.read_resource(url)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| PluginError::ResourceError(format!("{url} is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }
}
