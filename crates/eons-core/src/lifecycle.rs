//! Plug-in instance lifecycle states

use serde::{Deserialize, Serialize};

/// States of one installed plug-in's instance slot
///
/// State transitions:
/// ```text
/// Installed → Starting → Active → Stopping → Stopped
///                ↑                    │
///                └────────────────────┘ (restart with a new instance)
///      Starting / Active / Stopping → Failed → Starting (retry)
/// ```
///
/// An information probe runs the same path as a real start; for reloadable
/// plug-in types it is followed at once by a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No instance has been created yet
    #[default]
    Installed,
    /// An instance is being created and initialized
    Starting,
    /// The instance initialized and is running
    Active,
    /// The instance is being hidden and unloaded
    Stopping,
    /// The last instance was unloaded and discarded
    Stopped,
    /// The last start or stop failed
    Failed,
}

impl LifecycleState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, target),
            // Normal lifecycle transitions
            (Installed, Starting)
                | (Starting, Active)
                | (Active, Stopping)
                | (Stopping, Stopped)
                // Restart with a fresh instance
                | (Stopped, Starting)
                | (Failed, Starting)
                // Callbacks can fail
                | (Starting, Failed)
                | (Active, Failed)
                | (Stopping, Failed)
        )
    }

    /// Check if an instance is running in this state
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    /// Check if a start or stop is in progress
    pub fn is_transitioning(&self) -> bool {
        matches!(self, LifecycleState::Starting | LifecycleState::Stopping)
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            LifecycleState::Installed => "Plug-in has not been started",
            LifecycleState::Starting => "Plug-in is starting",
            LifecycleState::Active => "Plug-in is running",
            LifecycleState::Stopping => "Plug-in is stopping",
            LifecycleState::Stopped => "Plug-in has stopped",
            LifecycleState::Failed => "Plug-in has failed",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Installed => write!(f, "Installed"),
            LifecycleState::Starting => write!(f, "Starting"),
            LifecycleState::Active => write!(f, "Active"),
            LifecycleState::Stopping => write!(f, "Stopping"),
            LifecycleState::Stopped => write!(f, "Stopped"),
            LifecycleState::Failed => write!(f, "Failed"),
        }
    }
}
