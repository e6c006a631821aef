//! Request types for the caller-facing operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::TimeOffMap;
use crate::scheduling::OccupancyInput;

/// Input to [`super::SchedulingEngine::compute_month_schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthScheduleRequest {
    /// Occupancy carried over from a previous response, as a mapping or as
    /// its serialized text. Absent means an empty store.
    #[serde(default)]
    pub occupancy: Option<OccupancyInput>,
    /// Current time as Unix seconds; selects the month.
    pub now_epoch: i64,
    /// Temporary time-off merged over the central store.
    #[serde(default)]
    pub additional_time_off: Option<TimeOffMap>,
    /// Fixed offset in hours. Defaults to the configured offset.
    #[serde(default)]
    pub tz_offset_hours: Option<i32>,
    /// Whether to consult the central store. Defaults to the configured value.
    #[serde(default)]
    pub use_global_pto: Option<bool>,
}

impl MonthScheduleRequest {
    /// A request for the month containing `now_epoch` with every option left
    /// at its default.
    pub fn at(now_epoch: i64) -> Self {
        Self {
            occupancy: None,
            now_epoch,
            additional_time_off: None,
            tz_offset_hours: None,
            use_global_pto: None,
        }
    }
}

/// Input to [`super::SchedulingEngine::evaluate_pto_request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtoRequest {
    /// The requesting person.
    pub person_id: String,
    /// The requested days. Duplicates are ignored.
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    /// Whether to consult the central store. Defaults to the configured value.
    #[serde(default)]
    pub use_global_pto: Option<bool>,
    /// Strict requests may persist; non-strict requests are what-if queries.
    #[serde(default)]
    pub strict: bool,
    /// Persist approved dates. Only honoured for strict requests.
    #[serde(default)]
    pub save_if_approved: bool,
    /// Temporary time-off merged over the central store.
    #[serde(default)]
    pub additional_time_off: Option<TimeOffMap>,
}

impl PtoRequest {
    /// A non-strict what-if request using configured defaults.
    pub fn new(person_id: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            person_id: person_id.into(),
            dates,
            use_global_pto: None,
            strict: false,
            save_if_approved: false,
            additional_time_off: None,
        }
    }

    /// Makes the request strict, optionally persisting on approval.
    pub fn strict(mut self, save_if_approved: bool) -> Self {
        self.strict = true;
        self.save_if_approved = save_if_approved;
        self
    }
}

/// Administrative time-off action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffAction {
    /// Record approved entries without a feasibility check.
    Save,
    /// Remove entries.
    Delete,
    /// Read the effective central time-off.
    Get,
}

/// Input to [`super::SchedulingEngine::manage_time_off`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOffCommand {
    /// The action to perform.
    pub action: TimeOffAction,
    /// Required for `save` and `delete`; filters `get`.
    #[serde(default)]
    pub person_id: Option<String>,
    /// Required for `save` and `delete`; bounds the range for `get`.
    #[serde(default)]
    pub dates: Option<Vec<NaiveDate>>,
}
