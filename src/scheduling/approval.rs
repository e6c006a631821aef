//! Strict time-off approval.
//!
//! Approval is two-phase. [`evaluate_request`] runs the feasibility check
//! against a hypothetical time-off map that already includes the request and
//! never touches storage. Only an [`ApprovalOutcome::Approved`] result yields
//! a [`CommitToken`], and only [`commit`] writes to the store. A rejected
//! request therefore cannot reach the store.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{TimeOffMap, TimeOffStatus};
use crate::store::{TimeOffStore, with_timeout};

use super::feasibility::{FeasibilityReport, StaffingContext, Violation, evaluate_staffing};
use super::time_off::merge;

/// The terminal state of an approval.
///
/// A request is under evaluation only for the duration of
/// [`evaluate_request`], which always leaves it in one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// The request keeps every department staffed.
    Approved,
    /// The request would violate at least one staffing guarantee.
    Rejected,
}

/// A time-off request for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// The requesting person.
    pub person_id: String,
    /// The requested days.
    pub dates: BTreeSet<NaiveDate>,
}

impl ApprovalRequest {
    /// Creates a request, de-duplicating dates.
    pub fn new(person_id: impl Into<String>, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            person_id: person_id.into(),
            dates: dates.into_iter().collect(),
        }
    }

    /// The inclusive range spanned by the requested dates, if any.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// The request expressed as a time-off map.
    pub fn as_time_off(&self) -> TimeOffMap {
        self.dates
            .iter()
            .map(|date| (*date, BTreeSet::from([self.person_id.clone()])))
            .collect()
    }
}

/// Proof that a request passed feasibility, required to write it.
#[must_use = "an approved request is not persisted until the token is committed"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitToken {
    request: ApprovalRequest,
    report: FeasibilityReport,
}

impl CommitToken {
    /// The approved request.
    pub fn request(&self) -> &ApprovalRequest {
        &self.request
    }

    /// The feasibility report the approval was based on.
    pub fn report(&self) -> &FeasibilityReport {
        &self.report
    }
}

/// The result of the evaluation phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Feasible; commit the token to persist.
    Approved(CommitToken),
    /// Infeasible; nothing may be persisted.
    Rejected(FeasibilityReport),
}

impl ApprovalOutcome {
    /// The terminal state this outcome represents.
    pub fn state(&self) -> ApprovalState {
        match self {
            ApprovalOutcome::Approved(_) => ApprovalState::Approved,
            ApprovalOutcome::Rejected(_) => ApprovalState::Rejected,
        }
    }

    /// The feasibility report behind the decision.
    pub fn report(&self) -> &FeasibilityReport {
        match self {
            ApprovalOutcome::Approved(token) => &token.report,
            ApprovalOutcome::Rejected(report) => report,
        }
    }

    /// The violations that caused a rejection; empty when approved.
    pub fn violations(&self) -> &[Violation] {
        &self.report().violations
    }
}

/// Evaluates a request against the current effective time-off map.
///
/// The hypothetical map is `merge(current, request)`, checked over the range
/// spanned by the requested dates. An empty request is approved without a
/// check.
pub fn evaluate_request(
    ctx: StaffingContext<'_>,
    current_time_off: &TimeOffMap,
    request: ApprovalRequest,
) -> ApprovalOutcome {
    let Some((start_date, end_date)) = request.span() else {
        return ApprovalOutcome::Approved(CommitToken {
            report: FeasibilityReport {
                feasible: true,
                start_date: NaiveDate::MIN,
                end_date: NaiveDate::MIN,
                violations: Vec::new(),
            },
            request,
        });
    };

    let hypothetical = merge(current_time_off, &request.as_time_off());
    let report = evaluate_staffing(ctx, &hypothetical, start_date, end_date);

    if report.feasible {
        ApprovalOutcome::Approved(CommitToken { request, report })
    } else {
        ApprovalOutcome::Rejected(report)
    }
}

/// What a successful commit wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Dates newly written as approved.
    pub saved: Vec<NaiveDate>,
    /// Dates that were already approved in the store.
    pub already_present: Vec<NaiveDate>,
}

/// A commit that failed part-way. The request is still approved; retry by
/// committing `token` again.
#[derive(Debug)]
pub struct CommitFailure {
    /// The token to retry with.
    pub token: CommitToken,
    /// The write error that stopped the commit.
    pub error: EngineError,
    /// Dates written before the failure that could not be rolled back.
    pub left_behind: Vec<NaiveDate>,
}

/// Persists an approved request, one entry per date.
///
/// Each entry's earlier status is looked up before it is written. On the
/// first failed lookup or insert, every entry written by this commit is put
/// back: new entries are deleted and pending or denied entries get their old
/// status again.
pub async fn commit<S: TimeOffStore>(
    token: CommitToken,
    store: &S,
    timeout: Duration,
) -> Result<CommitReceipt, CommitFailure> {
    let person_id = token.request.person_id.clone();
    let dates: Vec<NaiveDate> = token.request.dates.iter().copied().collect();
    let mut receipt = CommitReceipt::default();
    let mut written: Vec<(NaiveDate, Option<TimeOffStatus>)> = Vec::new();

    for date in dates {
        match write_one(store, &person_id, date, timeout).await {
            Ok(Write::Inserted { previous }) => {
                receipt.saved.push(date);
                written.push((date, previous));
            }
            Ok(Write::AlreadyApproved) => receipt.already_present.push(date),
            Err(err) => {
                warn!(
                    person_id = %person_id,
                    date = %date,
                    error = %err,
                    "Time-off write failed, rolling back this commit"
                );
                let left_behind = roll_back(store, &person_id, &written, timeout).await;
                let error = EngineError::CollaboratorWrite {
                    person_id,
                    date,
                    message: err.to_string(),
                };
                return Err(CommitFailure {
                    token,
                    error,
                    left_behind,
                });
            }
        }
    }

    info!(
        person_id = %person_id,
        saved = receipt.saved.len(),
        already_present = receipt.already_present.len(),
        "Committed approved time-off"
    );
    Ok(receipt)
}

enum Write {
    Inserted { previous: Option<TimeOffStatus> },
    AlreadyApproved,
}

async fn write_one<S: TimeOffStore>(
    store: &S,
    person_id: &str,
    date: NaiveDate,
    timeout: Duration,
) -> EngineResult<Write> {
    let previous = with_timeout("lookup", timeout, store.lookup(person_id, date)).await?;
    if previous == Some(TimeOffStatus::Approved) {
        return Ok(Write::AlreadyApproved);
    }

    let inserted =
        with_timeout("insert_approved", timeout, store.insert_approved(person_id, date)).await?;
    if inserted {
        Ok(Write::Inserted { previous })
    } else {
        Ok(Write::AlreadyApproved)
    }
}

async fn roll_back<S: TimeOffStore>(
    store: &S,
    person_id: &str,
    written: &[(NaiveDate, Option<TimeOffStatus>)],
    timeout: Duration,
) -> Vec<NaiveDate> {
    let mut left_behind = Vec::new();
    for (date, previous) in written.iter().rev() {
        let result = match previous {
            None => with_timeout("delete", timeout, store.delete(person_id, *date))
                .await
                .map(|_| ()),
            Some(status) => {
                with_timeout("restore", timeout, store.restore(person_id, *date, *status)).await
            }
        };
        if let Err(err) = result {
            warn!(person_id = %person_id, date = %date, error = %err, "Rollback failed");
            left_behind.push(*date);
        }
    }
    left_behind.reverse();
    left_behind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, Person, Role, Task, TaskStatus, time_off_map_from_entries};
    use crate::error::EngineError;
    use crate::models::TimeOffEntry;
    use crate::store::InMemoryTimeOffStore;

    /// Fails every insert for one date and otherwise defers to memory.
    struct RefusingStore {
        inner: InMemoryTimeOffStore,
        refuse: NaiveDate,
    }

    impl TimeOffStore for RefusingStore {
        async fn query_approved(
            &self,
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> EngineResult<Vec<(String, NaiveDate)>> {
            self.inner.query_approved(start_date, end_date).await
        }

        async fn insert_approved(&self, person_id: &str, date: NaiveDate) -> EngineResult<bool> {
            if date == self.refuse {
                return Err(EngineError::CollaboratorUnavailable {
                    operation: "insert_approved".to_string(),
                    message: "refused".to_string(),
                });
            }
            self.inner.insert_approved(person_id, date).await
        }

        async fn delete(&self, person_id: &str, date: NaiveDate) -> EngineResult<bool> {
            self.inner.delete(person_id, date).await
        }

        async fn lookup(
            &self,
            person_id: &str,
            date: NaiveDate,
        ) -> EngineResult<Option<TimeOffStatus>> {
            self.inner.lookup(person_id, date).await
        }

        async fn restore(
            &self,
            person_id: &str,
            date: NaiveDate,
            status: TimeOffStatus,
        ) -> EngineResult<()> {
            self.inner.restore(person_id, date, status).await
        }
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn person(id: &str, skills: &[&str]) -> Person {
        Person {
            id: id.to_string(),
            name: id.to_uppercase(),
            role: Role::Employee,
            department_id: "ops".to_string(),
            job_title: String::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            level: 1,
            manager_id: None,
        }
    }

    struct Fixture {
        people: Vec<Person>,
        departments: Vec<Department>,
        tasks: Vec<Task>,
    }

    impl Fixture {
        fn new(min: u32) -> Self {
            Self {
                people: vec![person("p1", &["oncall"]), person("p2", &[]), person("p3", &[])],
                departments: vec![Department {
                    id: "ops".to_string(),
                    name: "Operations".to_string(),
                    manager_id: None,
                    critical_skills: BTreeSet::new(),
                    min_staffing_level: min,
                }],
                tasks: vec![Task {
                    id: "t1".to_string(),
                    department_id: "ops".to_string(),
                    assigned_to: vec!["p1".to_string(), "p2".to_string(), "p3".to_string()],
                    required_skills: BTreeSet::new(),
                    priority: 1,
                    start_date: make_date("2024-12-01"),
                    end_date: make_date("2024-12-31"),
                    status: TaskStatus::Active,
                }],
            }
        }

        fn ctx(&self) -> StaffingContext<'_> {
            StaffingContext {
                people: &self.people,
                departments: &self.departments,
                tasks: &self.tasks,
            }
        }
    }

    #[test]
    fn test_request_span_and_map() {
        let request = ApprovalRequest::new(
            "p1",
            vec![make_date("2024-12-09"), make_date("2024-12-02"), make_date("2024-12-09")],
        );
        assert_eq!(request.dates.len(), 2);
        assert_eq!(request.span(), Some((make_date("2024-12-02"), make_date("2024-12-09"))));
        assert_eq!(request.as_time_off().len(), 2);
    }

    #[test]
    fn test_evaluate_rejects_when_current_time_off_already_thin() {
        let fixture = Fixture::new(2);
        let current = time_off_map_from_entries(vec![("p2".to_string(), make_date("2024-12-10"))]);

        let outcome = evaluate_request(
            fixture.ctx(),
            &current,
            ApprovalRequest::new("p1", vec![make_date("2024-12-10")]),
        );
        assert_eq!(outcome.state(), ApprovalState::Rejected);
        assert_eq!(outcome.violations().len(), 1);
    }

    #[test]
    fn test_evaluate_approves_single_absence() {
        let fixture = Fixture::new(2);
        let outcome = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", vec![make_date("2024-12-10")]),
        );
        assert_eq!(outcome.state(), ApprovalState::Approved);
        assert!(outcome.violations().is_empty());
    }

    #[test]
    fn test_empty_request_is_approved() {
        let fixture = Fixture::new(3);
        let outcome = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", Vec::new()),
        );
        assert_eq!(outcome.state(), ApprovalState::Approved);
    }

    #[tokio::test]
    async fn test_commit_writes_each_date() {
        let fixture = Fixture::new(1);
        let store = InMemoryTimeOffStore::new();
        let outcome = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", vec![make_date("2024-12-10"), make_date("2024-12-11")]),
        );

        let ApprovalOutcome::Approved(token) = outcome else {
            panic!("expected approval");
        };
        let receipt = commit(token, &store, Duration::from_millis(100)).await.unwrap();
        assert_eq!(receipt.saved.len(), 2);
        assert!(receipt.already_present.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_commit_reports_already_present_dates() {
        let fixture = Fixture::new(1);
        let store = InMemoryTimeOffStore::new();
        store.insert_approved("p1", make_date("2024-12-10")).await.unwrap();

        let ApprovalOutcome::Approved(token) = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", vec![make_date("2024-12-10"), make_date("2024-12-11")]),
        ) else {
            panic!("expected approval");
        };

        let receipt = commit(token, &store, Duration::from_millis(100)).await.unwrap();
        assert_eq!(receipt.saved, vec![make_date("2024-12-11")]);
        assert_eq!(receipt.already_present, vec![make_date("2024-12-10")]);
    }

    #[tokio::test]
    async fn test_failed_commit_restores_pending_entry() {
        let fixture = Fixture::new(1);
        let store = RefusingStore {
            inner: InMemoryTimeOffStore::with_entries(vec![TimeOffEntry {
                person_id: "p1".to_string(),
                date: make_date("2024-12-02"),
                status: TimeOffStatus::Pending,
            }]),
            refuse: make_date("2024-12-03"),
        };

        let ApprovalOutcome::Approved(token) = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", vec![make_date("2024-12-02"), make_date("2024-12-03")]),
        ) else {
            panic!("expected approval");
        };

        let failure = commit(token, &store, Duration::from_millis(100)).await.unwrap_err();
        assert!(failure.left_behind.is_empty());
        assert_eq!(
            store.inner.status_of("p1", make_date("2024-12-02")),
            Some(TimeOffStatus::Pending)
        );
        assert_eq!(store.inner.status_of("p1", make_date("2024-12-03")), None);
        assert_eq!(store.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_deletes_new_entries() {
        let fixture = Fixture::new(1);
        let store = RefusingStore {
            inner: InMemoryTimeOffStore::new(),
            refuse: make_date("2024-12-11"),
        };

        let ApprovalOutcome::Approved(token) = evaluate_request(
            fixture.ctx(),
            &TimeOffMap::new(),
            ApprovalRequest::new("p1", vec![make_date("2024-12-10"), make_date("2024-12-11")]),
        ) else {
            panic!("expected approval");
        };

        let failure = commit(token, &store, Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(failure.token.request.dates.len(), 2);
        assert!(store.inner.is_empty());
    }

    #[test]
    fn test_approval_state_has_only_terminal_values() {
        let approved: ApprovalState = serde_json::from_str("\"approved\"").unwrap();
        let rejected: ApprovalState = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(approved, ApprovalState::Approved);
        assert_eq!(rejected, ApprovalState::Rejected);
        assert!(serde_json::from_str::<ApprovalState>("\"evaluating\"").is_err());
    }
}
