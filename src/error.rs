//! Error types for the PTO engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while resolving time-off,
//! evaluating staffing, or committing approvals.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the PTO engine.
///
/// A task or department that references an unknown person is not an error:
/// such a person simply contributes nothing to staffing counts.
///
/// # Example
///
/// ```
/// use pto_engine::error::EngineError;
///
/// let error = EngineError::MalformedInput {
///     message: "expected an object".to_string(),
/// };
/// assert_eq!(error.to_string(), "Malformed occupancy input: expected an object");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Occupancy input could not be parsed into the expected shape.
    #[error("Malformed occupancy input: {message}")]
    MalformedInput {
        /// A description of the parse failure.
        message: String,
    },

    /// The time-off collaborator could not be reached or timed out.
    #[error("Time-off store unavailable during '{operation}': {message}")]
    CollaboratorUnavailable {
        /// The collaborator operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// A write to the time-off collaborator failed.
    #[error("Failed to persist time-off for '{person_id}' on {date}: {message}")]
    CollaboratorWrite {
        /// The person whose entry could not be written.
        person_id: String,
        /// The date of the entry.
        date: NaiveDate,
        /// A description of the failure.
        message: String,
    },

    /// A strict operation refused to proceed on a degraded time-off view.
    #[error("Refusing '{operation}': global time-off could not be fetched")]
    DegradedMode {
        /// The operation that was refused.
        operation: String,
    },

    /// A request was missing a field or carried an invalid value.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::MalformedInput`].
    pub fn malformed(message: impl Into<String>) -> Self {
        EngineError::MalformedInput {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::InvalidRequest`].
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_displays_message() {
        let error = EngineError::malformed("not json");
        assert_eq!(error.to_string(), "Malformed occupancy input: not json");
    }

    #[test]
    fn test_collaborator_unavailable_displays_operation() {
        let error = EngineError::CollaboratorUnavailable {
            operation: "query_approved".to_string(),
            message: "timed out after 2000ms".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Time-off store unavailable during 'query_approved': timed out after 2000ms"
        );
    }

    #[test]
    fn test_collaborator_write_displays_person_and_date() {
        let error = EngineError::CollaboratorWrite {
            person_id: "p1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            message: "connection reset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to persist time-off for 'p1' on 2024-12-02: connection reset"
        );
    }

    #[test]
    fn test_degraded_mode_displays_operation() {
        let error = EngineError::DegradedMode {
            operation: "strict_approval".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Refusing 'strict_approval': global time-off could not be fetched"
        );
    }

    #[test]
    fn test_invalid_request_displays_field_and_message() {
        let error = EngineError::invalid_request("person_id", "required for save");
        assert_eq!(
            error.to_string(),
            "Invalid request field 'person_id': required for save"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_malformed() -> EngineResult<()> {
            Err(EngineError::malformed("bad"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_malformed()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
