//! Staffing feasibility evaluation.
//!
//! For each day in a range and each department with at least one active task
//! that day, the people assigned to those tasks minus everyone on time-off
//! must meet the department's staffing floor and cover every critical skill
//! (plus the required skills of the active tasks). Every violation is
//! collected; evaluation never stops at the first one.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Department, Person, Task, TimeOffMap};

use super::dates::days_inclusive;

/// Read-only directory data an evaluation runs against.
#[derive(Debug, Clone, Copy)]
pub struct StaffingContext<'a> {
    /// Known people. Task assignees missing from here count for nothing.
    pub people: &'a [Person],
    /// Departments to check.
    pub departments: &'a [Department],
    /// Tasks defining who is on duty and when.
    pub tasks: &'a [Task],
}

/// Why a department fails on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ViolationReason {
    /// Fewer people present than the department's minimum.
    Understaffed {
        /// The department's minimum staffing level.
        required: u32,
        /// People assigned and not on time-off.
        available: u32,
    },
    /// Nobody present holds a required skill.
    SkillGap {
        /// The uncovered skill.
        skill: String,
    },
}

/// A single `(day, department, reason)` violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The affected day.
    pub date: NaiveDate,
    /// The affected department.
    pub department_id: String,
    /// What went wrong.
    #[serde(flatten)]
    pub reason: ViolationReason,
}

/// The outcome of a feasibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// True if no violation was found.
    pub feasible: bool,
    /// First evaluated day.
    pub start_date: NaiveDate,
    /// Last evaluated day.
    pub end_date: NaiveDate,
    /// Every violation found, ordered by day then department.
    pub violations: Vec<Violation>,
}

/// Evaluates staffing for every day in `[start_date, end_date]`.
///
/// # Behavior
///
/// - A department with no active task on a day is vacuously feasible.
/// - A person assigned to several of a department's tasks counts once.
/// - A skill is covered by any one present person holding it.
/// - Tasks whose department is unknown are ignored.
///
/// # Examples
///
/// ```
/// use pto_engine::models::{Department, Person, Role, Task, TaskStatus, TimeOffMap};
/// use pto_engine::scheduling::{evaluate_staffing, StaffingContext};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
/// let person = |id: &str| Person {
///     id: id.to_string(),
///     name: id.to_string(),
///     role: Role::Employee,
///     department_id: "ops".to_string(),
///     job_title: String::new(),
///     skills: Default::default(),
///     level: 1,
///     manager_id: None,
/// };
/// let people = vec![person("p1"), person("p2")];
/// let departments = vec![Department {
///     id: "ops".to_string(),
///     name: "Operations".to_string(),
///     manager_id: None,
///     critical_skills: Default::default(),
///     min_staffing_level: 2,
/// }];
/// let tasks = vec![Task {
///     id: "t1".to_string(),
///     department_id: "ops".to_string(),
///     assigned_to: vec!["p1".to_string(), "p2".to_string()],
///     required_skills: Default::default(),
///     priority: 1,
///     start_date: day,
///     end_date: day,
///     status: TaskStatus::Active,
/// }];
/// let ctx = StaffingContext { people: &people, departments: &departments, tasks: &tasks };
///
/// assert!(evaluate_staffing(ctx, &TimeOffMap::new(), day, day).feasible);
///
/// let mut time_off = TimeOffMap::new();
/// time_off.entry(day).or_default().insert("p1".to_string());
/// assert!(!evaluate_staffing(ctx, &time_off, day, day).feasible);
/// ```
pub fn evaluate_staffing(
    ctx: StaffingContext<'_>,
    time_off: &TimeOffMap,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> FeasibilityReport {
    let people_by_id: HashMap<&str, &Person> =
        ctx.people.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut tasks_by_department: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in ctx.tasks {
        tasks_by_department
            .entry(task.department_id.as_str())
            .or_default()
            .push(task);
    }

    let mut departments: Vec<&Department> = ctx.departments.iter().collect();
    departments.sort_by(|a, b| a.id.cmp(&b.id));

    let no_absences = BTreeSet::new();
    let mut violations = Vec::new();

    for day in days_inclusive(start_date, end_date) {
        let absent = time_off.get(&day).unwrap_or(&no_absences);

        for department in &departments {
            let Some(department_tasks) = tasks_by_department.get(department.id.as_str()) else {
                continue;
            };
            let active: Vec<&Task> = department_tasks
                .iter()
                .copied()
                .filter(|t| t.is_active_on(day))
                .collect();
            if active.is_empty() {
                continue;
            }

            let roster: BTreeSet<&str> = active
                .iter()
                .flat_map(|t| t.assigned_to.iter().map(String::as_str))
                .filter(|id| people_by_id.contains_key(id))
                .collect();
            let present: Vec<&Person> = roster
                .iter()
                .filter(|id| !absent.contains(**id))
                .filter_map(|id| people_by_id.get(id).copied())
                .collect();

            let available = present.len() as u32;
            if available < department.min_staffing_level {
                violations.push(Violation {
                    date: day,
                    department_id: department.id.clone(),
                    reason: ViolationReason::Understaffed {
                        required: department.min_staffing_level,
                        available,
                    },
                });
            }

            let required_skills: BTreeSet<&str> = department
                .critical_skills
                .iter()
                .chain(active.iter().flat_map(|t| t.required_skills.iter()))
                .map(String::as_str)
                .collect();
            for skill in required_skills {
                if !present.iter().any(|p| p.has_skill(skill)) {
                    violations.push(Violation {
                        date: day,
                        department_id: department.id.clone(),
                        reason: ViolationReason::SkillGap {
                            skill: skill.to_string(),
                        },
                    });
                }
            }
        }
    }

    let orphaned = tasks_by_department
        .keys()
        .filter(|id| !departments.iter().any(|d| d.id == **id))
        .count();
    if orphaned > 0 {
        debug!(orphaned, "Ignoring tasks owned by unknown departments");
    }

    FeasibilityReport {
        feasible: violations.is_empty(),
        start_date,
        end_date,
        violations,
    }
}
