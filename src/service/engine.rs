//! The scheduling engine and its caller-facing operations.
//!
//! Each operation generates a correlation id, logs entry and completion with
//! the elapsed time, and converts failures into [`OperationError`].

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigLoader, EngineSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{Department, Person, Task, TimeOffMap};
use crate::scheduling::{
    ApprovalOutcome, ApprovalRequest, ApprovalState, CommitToken, OccupancyStore, StaffingContext,
    TimeOffResolver, build_month_view, commit, evaluate_request, record_task_assignments,
    restrict_to_range, target_month,
};
use crate::store::{Directory, StaticDirectory, TimeOffStore, with_timeout};

use super::request::{MonthScheduleRequest, PtoRequest, TimeOffAction, TimeOffCommand};
use super::response::{
    MonthScheduleResponse, OperationError, PersistenceStatus, PtoDecision, TimeOffResult,
};

/// Directory contents fetched once per operation.
struct Snapshot {
    people: Vec<Person>,
    departments: Vec<Department>,
    tasks: Vec<Task>,
}

impl Snapshot {
    fn ctx(&self) -> StaffingContext<'_> {
        StaffingContext {
            people: &self.people,
            departments: &self.departments,
            tasks: &self.tasks,
        }
    }
}

/// Entry point for scheduling and time-off operations.
///
/// Holds no per-request state. The time-off store and directory are injected
/// and their lifecycles belong to the caller.
///
/// # Example
///
/// ```no_run
/// use pto_engine::config::ConfigLoader;
/// use pto_engine::service::{MonthScheduleRequest, SchedulingEngine};
/// use pto_engine::store::InMemoryTimeOffStore;
///
/// # async fn run() -> Result<(), pto_engine::service::OperationError> {
/// let config = ConfigLoader::load("./config/acme")?;
/// let engine = SchedulingEngine::from_config(config, InMemoryTimeOffStore::new());
/// let schedule = engine
///     .compute_month_schedule(MonthScheduleRequest::at(1_733_832_000))
///     .await?;
/// println!("{} days", schedule.calendar.days.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SchedulingEngine<S, D> {
    settings: EngineSettings,
    store: S,
    directory: D,
}

impl<S: TimeOffStore> SchedulingEngine<S, StaticDirectory> {
    /// Builds an engine from a loaded configuration profile.
    pub fn from_config(config: ConfigLoader, store: S) -> Self {
        let config = config.into_config();
        Self::new(config.settings, store, config.directory)
    }
}

impl<S: TimeOffStore, D: Directory> SchedulingEngine<S, D> {
    /// Creates an engine from its parts.
    pub fn new(settings: EngineSettings, store: S, directory: D) -> Self {
        Self {
            settings,
            store,
            directory,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the time-off store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolver(&self) -> TimeOffResolver<'_, S> {
        TimeOffResolver::new(&self.store, self.settings.collaborator_timeout())
    }

    fn snapshot(&self) -> EngineResult<Snapshot> {
        Ok(Snapshot {
            people: self.directory.list_people()?,
            departments: self.directory.list_departments()?,
            tasks: self.directory.list_tasks()?,
        })
    }

    /// Builds the month view for the month containing `now_epoch`.
    ///
    /// The calendar reflects the supplied occupancy. The returned occupancy
    /// additionally records task assignments for the month when enabled in
    /// the settings. The central store is never written.
    pub async fn compute_month_schedule(
        &self,
        request: MonthScheduleRequest,
    ) -> Result<MonthScheduleResponse, OperationError> {
        let correlation_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(correlation_id = %correlation_id, now_epoch = request.now_epoch, "Computing month schedule");

        match self.month_schedule(correlation_id, request).await {
            Ok(response) => {
                info!(
                    correlation_id = %correlation_id,
                    year = response.calendar.year,
                    month = response.calendar.month,
                    people = response.calendar.summary.people,
                    degraded = response.degraded,
                    duration_us = start_time.elapsed().as_micros(),
                    "Month schedule computed"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(correlation_id = %correlation_id, error = %err, "Month schedule failed");
                Err(err.into())
            }
        }
    }

    async fn month_schedule(
        &self,
        correlation_id: Uuid,
        request: MonthScheduleRequest,
    ) -> EngineResult<MonthScheduleResponse> {
        let tz_offset_hours = request
            .tz_offset_hours
            .unwrap_or(self.settings.default_tz_offset_hours);
        if !EngineSettings::is_valid_tz_offset(tz_offset_hours) {
            return Err(EngineError::invalid_request(
                "tz_offset_hours",
                format!("{} is outside [-12, 14]", tz_offset_hours),
            ));
        }

        let occupancy = match request.occupancy {
            Some(input) => OccupancyStore::from_input(input)?,
            None => OccupancyStore::create_empty(),
        };
        let (first_day, last_day) = target_month(request.now_epoch, tz_offset_hours)?;

        let additional = request.additional_time_off.unwrap_or_default();
        let use_global = request.use_global_pto.unwrap_or(self.settings.use_global_pto);
        let resolved = self
            .resolver()
            .resolve(first_day, last_day, &additional, use_global)
            .await;

        let snapshot = self.snapshot()?;
        let calendar = build_month_view(
            &occupancy,
            request.now_epoch,
            &resolved.map,
            tz_offset_hours,
            &snapshot.people,
            &snapshot.departments,
            &snapshot.tasks,
        )?;

        let updated = if self.settings.record_task_assignments {
            record_task_assignments(
                &occupancy,
                first_day,
                last_day,
                &resolved.map,
                &snapshot.people,
                &snapshot.tasks,
            )
        } else {
            occupancy
        };
        debug!(correlation_id = %correlation_id, people = updated.len(), "Occupancy updated");

        Ok(MonthScheduleResponse {
            correlation_id,
            calendar,
            occupancy: updated.serialize()?,
            degraded: resolved.degraded,
        })
    }

    /// Decides whether a time-off request can be granted.
    ///
    /// Non-strict requests are what-if queries and never write. Strict
    /// requests with `save_if_approved` persist only after the request has
    /// been approved. When the central store cannot be read, strict requests
    /// fail with `DEGRADED_MODE` if `reject_on_degraded` is set; otherwise the
    /// decision is flagged as degraded.
    pub async fn evaluate_pto_request(
        &self,
        request: PtoRequest,
    ) -> Result<PtoDecision, OperationError> {
        let correlation_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(
            correlation_id = %correlation_id,
            person_id = %request.person_id,
            dates = request.dates.len(),
            strict = request.strict,
            "Evaluating time-off request"
        );

        match self.pto_decision(correlation_id, request).await {
            Ok(decision) => {
                info!(
                    correlation_id = %correlation_id,
                    approved = decision.approved,
                    violations = decision.violations.len(),
                    degraded = decision.degraded,
                    duration_us = start_time.elapsed().as_micros(),
                    "Time-off request evaluated"
                );
                Ok(decision)
            }
            Err(err) => {
                warn!(correlation_id = %correlation_id, error = %err, "Time-off evaluation failed");
                Err(err.into())
            }
        }
    }

    async fn pto_decision(
        &self,
        correlation_id: Uuid,
        request: PtoRequest,
    ) -> EngineResult<PtoDecision> {
        if request.person_id.trim().is_empty() {
            return Err(EngineError::invalid_request("person_id", "must not be empty"));
        }

        let approval = ApprovalRequest::new(request.person_id, request.dates);
        let Some((start_date, end_date)) = approval.span() else {
            return Ok(PtoDecision::new(
                correlation_id,
                ApprovalState::Approved,
                Vec::new(),
                false,
            ));
        };

        let additional = request.additional_time_off.unwrap_or_default();
        let use_global = request.use_global_pto.unwrap_or(self.settings.use_global_pto);
        let resolved = self
            .resolver()
            .resolve(start_date, end_date, &additional, use_global)
            .await;

        if request.strict && resolved.degraded && self.settings.reject_on_degraded {
            return Err(EngineError::DegradedMode {
                operation: "evaluate_pto_request".to_string(),
            });
        }

        let snapshot = self.snapshot()?;
        let outcome = evaluate_request(snapshot.ctx(), &resolved.map, approval);
        let decision = PtoDecision::new(
            correlation_id,
            outcome.state(),
            outcome.violations().to_vec(),
            resolved.degraded,
        );

        match outcome {
            ApprovalOutcome::Approved(token) if request.strict && request.save_if_approved => {
                let (persistence, retry) = self.persist(correlation_id, token).await;
                Ok(decision.with_persistence(persistence, retry))
            }
            _ => Ok(decision),
        }
    }

    /// Retries the write phase of an approved request without re-running
    /// feasibility.
    pub async fn retry_commit(&self, token: CommitToken) -> PtoDecision {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            person_id = %token.request().person_id,
            "Retrying time-off commit"
        );
        let (persistence, retry) = self.persist(correlation_id, token).await;
        PtoDecision::new(correlation_id, ApprovalState::Approved, Vec::new(), false)
            .with_persistence(persistence, retry)
    }

    async fn persist(
        &self,
        correlation_id: Uuid,
        token: CommitToken,
    ) -> (PersistenceStatus, Option<CommitToken>) {
        match commit(token, &self.store, self.settings.collaborator_timeout()).await {
            Ok(receipt) => (
                PersistenceStatus::Saved {
                    saved: receipt.saved,
                    already_present: receipt.already_present,
                },
                None,
            ),
            Err(failure) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %failure.error,
                    left_behind = failure.left_behind.len(),
                    "Approved time-off not saved"
                );
                (
                    PersistenceStatus::Failed {
                        message: failure.error.to_string(),
                    },
                    Some(failure.token),
                )
            }
        }
    }

    /// Saves, deletes or reads central time-off.
    ///
    /// Saves bypass feasibility checks.
    pub async fn manage_time_off(
        &self,
        command: TimeOffCommand,
    ) -> Result<TimeOffResult, OperationError> {
        let correlation_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(correlation_id = %correlation_id, action = ?command.action, "Managing time-off");

        let result = match command.action {
            TimeOffAction::Save => self.save_time_off(command).await,
            TimeOffAction::Delete => self.delete_time_off(command).await,
            TimeOffAction::Get => Ok(self.get_time_off(command).await),
        };

        match result {
            Ok(result) => {
                info!(
                    correlation_id = %correlation_id,
                    duration_us = start_time.elapsed().as_micros(),
                    "Time-off action completed"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(correlation_id = %correlation_id, error = %err, "Time-off action failed");
                Err(err.into())
            }
        }
    }

    async fn save_time_off(&self, command: TimeOffCommand) -> EngineResult<TimeOffResult> {
        let (person_id, dates) = require_person_and_dates(command)?;
        let timeout = self.settings.collaborator_timeout();
        let mut saved = Vec::new();
        let mut already_present = Vec::new();

        for date in dates {
            let call = self.store.insert_approved(&person_id, date);
            let inserted = with_timeout("insert_approved", timeout, call)
                .await
                .map_err(|e| write_error(&person_id, date, e))?;
            if inserted {
                saved.push(date);
            } else {
                already_present.push(date);
            }
        }

        Ok(TimeOffResult::Save {
            person_id,
            saved,
            already_present,
        })
    }

    async fn delete_time_off(&self, command: TimeOffCommand) -> EngineResult<TimeOffResult> {
        let (person_id, dates) = require_person_and_dates(command)?;
        let timeout = self.settings.collaborator_timeout();
        let mut removed = Vec::new();
        let mut missing = Vec::new();

        for date in dates {
            let call = self.store.delete(&person_id, date);
            let deleted = with_timeout("delete", timeout, call)
                .await
                .map_err(|e| write_error(&person_id, date, e))?;
            if deleted {
                removed.push(date);
            } else {
                missing.push(date);
            }
        }

        Ok(TimeOffResult::Delete {
            person_id,
            removed,
            missing,
        })
    }

    async fn get_time_off(&self, command: TimeOffCommand) -> TimeOffResult {
        let dates: BTreeSet<NaiveDate> = command.dates.unwrap_or_default().into_iter().collect();
        let start_date = dates.first().copied().unwrap_or(NaiveDate::MIN);
        let end_date = dates.last().copied().unwrap_or(NaiveDate::MAX);

        let resolved = self.resolver().fetch_global(start_date, end_date).await;
        let time_off = match command.person_id {
            Some(person_id) => only_person(&resolved.map, &person_id),
            None => resolved.map,
        };

        TimeOffResult::Get {
            time_off: restrict_to_range(&time_off, start_date, end_date),
            degraded: resolved.degraded,
        }
    }
}

fn require_person_and_dates(command: TimeOffCommand) -> EngineResult<(String, BTreeSet<NaiveDate>)> {
    let person_id = command
        .person_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| EngineError::invalid_request("person_id", "required for save and delete"))?;
    let dates: BTreeSet<NaiveDate> = command.dates.unwrap_or_default().into_iter().collect();
    if dates.is_empty() {
        return Err(EngineError::invalid_request("dates", "required for save and delete"));
    }
    Ok((person_id, dates))
}

fn write_error(person_id: &str, date: NaiveDate, error: EngineError) -> EngineError {
    EngineError::CollaboratorWrite {
        person_id: person_id.to_string(),
        date,
        message: error.to_string(),
    }
}

fn only_person(map: &TimeOffMap, person_id: &str) -> TimeOffMap {
    map.iter()
        .filter(|(_, people)| people.contains(person_id))
        .map(|(date, _)| (*date, BTreeSet::from([person_id.to_string()])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, TaskStatus, TimeOffEntry};
    use crate::store::InMemoryTimeOffStore;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn small_directory() -> StaticDirectory {
        let person = |id: &str| Person {
            id: id.to_string(),
            name: id.to_uppercase(),
            role: Role::Employee,
            department_id: "ops".to_string(),
            job_title: String::new(),
            skills: BTreeSet::new(),
            level: 1,
            manager_id: None,
        };
        StaticDirectory {
            people: vec![person("p1"), person("p2")],
            departments: vec![Department {
                id: "ops".to_string(),
                name: "Operations".to_string(),
                manager_id: None,
                critical_skills: BTreeSet::new(),
                min_staffing_level: 1,
            }],
            tasks: vec![Task {
                id: "t1".to_string(),
                department_id: "ops".to_string(),
                assigned_to: vec!["p1".to_string(), "p2".to_string()],
                required_skills: BTreeSet::new(),
                priority: 1,
                start_date: make_date("2024-12-01"),
                end_date: make_date("2024-12-31"),
                status: TaskStatus::Active,
            }],
        }
    }

    fn engine(store: InMemoryTimeOffStore) -> SchedulingEngine<InMemoryTimeOffStore, StaticDirectory> {
        SchedulingEngine::new(EngineSettings::default(), store, small_directory())
    }

    #[test]
    fn test_only_person_filters_map() {
        let mut map = TimeOffMap::new();
        map.insert(
            make_date("2024-12-02"),
            BTreeSet::from(["p1".to_string(), "p2".to_string()]),
        );
        map.insert(make_date("2024-12-03"), BTreeSet::from(["p2".to_string()]));

        let filtered = only_person(&map, "p1");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[&make_date("2024-12-02")].len(), 1);
    }

    #[test]
    fn test_require_person_and_dates() {
        let missing_person = TimeOffCommand {
            action: TimeOffAction::Save,
            person_id: None,
            dates: Some(vec![make_date("2024-12-02")]),
        };
        assert!(matches!(
            require_person_and_dates(missing_person),
            Err(EngineError::InvalidRequest { field, .. }) if field == "person_id"
        ));

        let missing_dates = TimeOffCommand {
            action: TimeOffAction::Delete,
            person_id: Some("p1".to_string()),
            dates: Some(Vec::new()),
        };
        assert!(matches!(
            require_person_and_dates(missing_dates),
            Err(EngineError::InvalidRequest { field, .. }) if field == "dates"
        ));
    }

    #[tokio::test]
    async fn test_month_schedule_rejects_bad_offset() {
        let engine = engine(InMemoryTimeOffStore::new());
        let mut request = MonthScheduleRequest::at(1_733_832_000);
        request.tz_offset_hours = Some(20);

        let err = engine.compute_month_schedule(request).await.unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_month_schedule_records_assignments() {
        let engine = engine(InMemoryTimeOffStore::with_entries(vec![TimeOffEntry::approved(
            "p2",
            make_date("2024-12-05"),
        )]));

        let response = engine
            .compute_month_schedule(MonthScheduleRequest::at(1_733_832_000))
            .await
            .unwrap();
        let occupancy = OccupancyStore::parse(&response.occupancy).unwrap();
        assert_eq!(occupancy.occupied_dates("p1").len(), 31);
        assert_eq!(occupancy.occupied_dates("p2").len(), 30);
        assert!(!occupancy.is_occupied("p2", make_date("2024-12-05")));
    }

    #[tokio::test]
    async fn test_empty_person_id_is_invalid() {
        let engine = engine(InMemoryTimeOffStore::new());
        let err = engine
            .evaluate_pto_request(PtoRequest::new("  ", vec![make_date("2024-12-02")]))
            .await
            .unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_strict_never_writes() {
        let engine = engine(InMemoryTimeOffStore::new());
        let mut request = PtoRequest::new("p1", vec![make_date("2024-12-02")]);
        request.save_if_approved = true;

        let decision = engine.evaluate_pto_request(request).await.unwrap();
        assert!(decision.approved);
        assert_eq!(decision.persistence, PersistenceStatus::NotRequested);
        assert!(engine.store().is_empty());
    }
}
