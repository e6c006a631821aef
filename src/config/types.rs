//! Configuration types for the PTO engine.
//!
//! These types mirror the structure of the YAML files in a configuration
//! profile directory.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::StaticDirectory;

/// Smallest fixed timezone offset accepted, in hours.
pub const MIN_TZ_OFFSET_HOURS: i32 = -12;

/// Largest fixed timezone offset accepted, in hours.
pub const MAX_TZ_OFFSET_HOURS: i32 = 14;

/// Engine settings from `engine.yaml`.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Bound on each call to the time-off store, in milliseconds.
    pub collaborator_timeout_ms: u64,
    /// Timezone offset used when a request does not give one.
    pub default_tz_offset_hours: i32,
    /// Whether requests consult the central time-off store by default.
    pub use_global_pto: bool,
    /// Whether strict approval fails when the central store could not be read.
    pub reject_on_degraded: bool,
    /// Whether month schedules record task assignees as occupied.
    pub record_task_assignments: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: 2000,
            default_tz_offset_hours: 0,
            use_global_pto: true,
            reject_on_degraded: true,
            record_task_assignments: true,
        }
    }
}

impl EngineSettings {
    /// The collaborator timeout as a [`Duration`].
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    /// Whether `offset` lies in the accepted range of fixed offsets.
    pub fn is_valid_tz_offset(offset: i32) -> bool {
        (MIN_TZ_OFFSET_HOURS..=MAX_TZ_OFFSET_HOURS).contains(&offset)
    }
}

/// A fully loaded configuration profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Settings from `engine.yaml`.
    pub settings: EngineSettings,
    /// People, departments and tasks from `directory.yaml`.
    pub directory: StaticDirectory,
}
