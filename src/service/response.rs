//! Response types for the caller-facing operations.
//!
//! Every operation returns either one of the payloads below or an
//! [`OperationError`] with a stable code.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::TimeOffMap;
use crate::scheduling::{ApprovalState, CommitToken, MonthView, Violation};

/// Structured failure returned by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl OperationError {
    /// Creates a new operation error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new operation error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<EngineError> for OperationError {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::MalformedInput { .. } => OperationError::with_details(
                "MALFORMED_INPUT",
                message,
                "Occupancy must be an object of person ids to arrays of YYYY-MM-DD dates",
            ),
            EngineError::CollaboratorUnavailable { operation, .. } => OperationError::with_details(
                "COLLABORATOR_UNAVAILABLE",
                message,
                format!("The time-off store did not answer '{}'", operation),
            ),
            EngineError::CollaboratorWrite { .. } => {
                OperationError::new("COLLABORATOR_WRITE_FAILED", message)
            }
            EngineError::DegradedMode { .. } => OperationError::with_details(
                "DEGRADED_MODE",
                message,
                "Retry once the time-off store is reachable",
            ),
            EngineError::InvalidRequest { field, .. } => OperationError::with_details(
                "VALIDATION_ERROR",
                message,
                format!("Check the '{}' field of the request", field),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                OperationError::new("CONFIG_ERROR", message)
            }
        }
    }
}

/// Output of [`super::SchedulingEngine::compute_month_schedule`].
#[derive(Debug, Clone, Serialize)]
pub struct MonthScheduleResponse {
    /// Correlation id logged for this operation.
    pub correlation_id: Uuid,
    /// The month view.
    pub calendar: MonthView,
    /// Serialized occupancy to hand back on the next request.
    pub occupancy: String,
    /// True if the central store could not be read.
    pub degraded: bool,
}

/// Whether approved dates reached the time-off store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceStatus {
    /// Nothing was to be written.
    NotRequested,
    /// Every date is now approved in the store.
    Saved {
        /// Dates newly written.
        saved: Vec<NaiveDate>,
        /// Dates that were already approved.
        already_present: Vec<NaiveDate>,
    },
    /// Approved but not saved; retry with the decision's commit token.
    Failed {
        /// Why the write failed.
        message: String,
    },
}

/// Output of [`super::SchedulingEngine::evaluate_pto_request`].
#[derive(Debug, Clone, Serialize)]
pub struct PtoDecision {
    /// Correlation id logged for this operation.
    pub correlation_id: Uuid,
    /// True if the request keeps every department staffed.
    pub approved: bool,
    /// Terminal approval state.
    pub state: ApprovalState,
    /// Every violation the request would cause.
    pub violations: Vec<Violation>,
    /// True if the central store could not be read.
    pub degraded: bool,
    /// Outcome of the write phase.
    pub persistence: PersistenceStatus,
    #[serde(skip)]
    retry_token: Option<CommitToken>,
}

impl PtoDecision {
    pub(crate) fn new(
        correlation_id: Uuid,
        state: ApprovalState,
        violations: Vec<Violation>,
        degraded: bool,
    ) -> Self {
        Self {
            correlation_id,
            approved: state == ApprovalState::Approved,
            state,
            violations,
            degraded,
            persistence: PersistenceStatus::NotRequested,
            retry_token: None,
        }
    }

    pub(crate) fn with_persistence(
        mut self,
        persistence: PersistenceStatus,
        retry_token: Option<CommitToken>,
    ) -> Self {
        self.persistence = persistence;
        self.retry_token = retry_token;
        self
    }

    /// True if the request was approved but the write failed.
    pub fn approved_but_not_saved(&self) -> bool {
        self.approved && matches!(self.persistence, PersistenceStatus::Failed { .. })
    }

    /// Takes the token for retrying a failed write.
    pub fn take_retry_token(&mut self) -> Option<CommitToken> {
        self.retry_token.take()
    }
}

/// Output of [`super::SchedulingEngine::manage_time_off`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TimeOffResult {
    /// Result of a save.
    Save {
        /// The person saved for.
        person_id: String,
        /// Dates newly written.
        saved: Vec<NaiveDate>,
        /// Dates that were already approved.
        already_present: Vec<NaiveDate>,
    },
    /// Result of a delete.
    Delete {
        /// The person deleted for.
        person_id: String,
        /// Dates removed.
        removed: Vec<NaiveDate>,
        /// Dates that had no entry.
        missing: Vec<NaiveDate>,
    },
    /// Result of a get.
    Get {
        /// Effective central time-off in the requested range.
        time_off: TimeOffMap,
        /// True if the central store could not be read.
        degraded: bool,
    },
}
