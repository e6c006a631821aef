//! Task model.
//!
//! A task defines a staffing obligation window for a department: the people
//! assigned to it must keep the department staffed on every day it covers.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Scheduled but not started.
    Planned,
    /// In progress.
    Active,
    /// Finished; still counted for the days it covers.
    Completed,
    /// Called off; carries no staffing obligation.
    Cancelled,
}

/// A unit of work owned by a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: String,
    /// The owning department.
    pub department_id: String,
    /// People assigned to the task.
    #[serde(default)]
    pub assigned_to: Vec<String>,
    /// Skills the task needs covered while it runs.
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// Priority, higher is more important.
    #[serde(default)]
    pub priority: u32,
    /// First covered day (inclusive).
    pub start_date: NaiveDate,
    /// Last covered day (inclusive).
    pub end_date: NaiveDate,
    /// Lifecycle status.
    pub status: TaskStatus,
}

impl Task {
    /// Returns true if the task carries a staffing obligation on `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pto_engine::models::{Task, TaskStatus};
    /// use chrono::NaiveDate;
    ///
    /// let task = Task {
    ///     id: "t1".to_string(),
    ///     department_id: "ops".to_string(),
    ///     assigned_to: vec!["p1".to_string()],
    ///     required_skills: Default::default(),
    ///     priority: 1,
    ///     start_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    ///     status: TaskStatus::Active,
    /// };
    /// assert!(task.is_active_on(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
    /// assert!(!task.is_active_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    /// ```
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.status != TaskStatus::Cancelled && date >= self.start_date && date <= self.end_date
    }
}
