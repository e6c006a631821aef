//! The time-off record store interface.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::TimeOffStatus;

/// Central store of time-off records (a document database in production).
///
/// Implementations are expected to enforce uniqueness of `(person_id, date)`
/// so that concurrent approvals for the same pair cannot both land.
pub trait TimeOffStore: Send + Sync {
    /// Returns every approved `(person_id, date)` pair with `date` in
    /// `[start_date, end_date]`.
    fn query_approved(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> impl Future<Output = EngineResult<Vec<(String, NaiveDate)>>> + Send;

    /// Records an approved entry. Returns `false` if the pair was already
    /// approved.
    fn insert_approved(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<bool>> + Send;

    /// Removes an entry. Returns `false` if there was nothing to remove.
    fn delete(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<bool>> + Send;

    /// Returns the status of an entry of any status, if one exists.
    fn lookup(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<Option<TimeOffStatus>>> + Send;

    /// Puts an existing entry back to `status`.
    fn restore(
        &self,
        person_id: &str,
        date: NaiveDate,
        status: TimeOffStatus,
    ) -> impl Future<Output = EngineResult<()>> + Send;
}

impl<T: TimeOffStore> TimeOffStore for Arc<T> {
    fn query_approved(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> impl Future<Output = EngineResult<Vec<(String, NaiveDate)>>> + Send {
        (**self).query_approved(start_date, end_date)
    }

    fn insert_approved(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<bool>> + Send {
        (**self).insert_approved(person_id, date)
    }

    fn delete(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<bool>> + Send {
        (**self).delete(person_id, date)
    }

    fn lookup(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = EngineResult<Option<TimeOffStatus>>> + Send {
        (**self).lookup(person_id, date)
    }

    fn restore(
        &self,
        person_id: &str,
        date: NaiveDate,
        status: TimeOffStatus,
    ) -> impl Future<Output = EngineResult<()>> + Send {
        (**self).restore(person_id, date, status)
    }
}

/// Runs a collaborator call under a time bound.
///
/// Elapsing the bound yields [`EngineError::CollaboratorUnavailable`] naming
/// the operation.
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, call: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::CollaboratorUnavailable {
            operation: operation.to_string(),
            message: format!("timed out after {}ms", limit.as_millis()),
        }),
    }
}
