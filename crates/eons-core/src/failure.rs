//! Bundles whose plug-ins failed to start or stop

use dashmap::DashSet;
use tracing::warn;
use uuid::Uuid;

/// Catalog uuids of bundles whose plug-ins failed.
///
/// The host consults this before starting extensions so that a bundle which
/// failed once is not retried automatically. One tracker is shared by every
/// lifecycle manager of a host.
#[derive(Debug, Default)]
pub struct FailureTracker {
    failed: DashSet<Uuid>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. Returns `true` if the uuid was not already marked.
    pub fn mark_failed(&self, uuid: Uuid) -> bool {
        let newly = self.failed.insert(uuid);
        if newly {
            warn!(%uuid, "Marked bundle as failed");
        }
        newly
    }

    pub fn is_failed(&self, uuid: &Uuid) -> bool {
        self.failed.contains(uuid)
    }

    /// Forget a failure, for example after the bundle was updated.
    pub fn clear(&self, uuid: &Uuid) -> bool {
        self.failed.remove(uuid).is_some()
    }

    /// All marked uuids, sorted.
    pub fn failed(&self) -> Vec<Uuid> {
        let mut uuids: Vec<Uuid> = self.failed.iter().map(|entry| *entry).collect();
        uuids.sort();
        uuids
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
}
