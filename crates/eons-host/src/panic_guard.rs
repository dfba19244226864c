//! Panic containment around plug-in callbacks
//!
//! Plug-in code runs inside the host process. A panic in `initialize`,
//! `unload` or `show` must fail that plug-in, not unwind through the
//! lifecycle manager and poison its bookkeeping.

use std::any::Any;
use std::panic::{self, UnwindSafe};

/// Run a plug-in callback, converting a panic into its message.
pub(crate) fn catch_panic<F, R>(identifier: &str, f: F) -> Result<R, String>
where
    F: FnOnce() -> R + UnwindSafe,
{
    panic::catch_unwind(f).map_err(|payload| {
        let message = panic_to_string(payload.as_ref());
        tracing::error!(identifier, "Plug-in panic caught: {}", message);
        message
    })
}

/// Convert a panic payload to a human-readable string
///
/// Handles common panic payload types (&str, String) and provides
/// a fallback for unknown types.
pub(crate) fn panic_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("plug-in panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("plug-in panicked: {s}")
    } else {
        "plug-in panicked with unknown payload".to_string()
    }
}
