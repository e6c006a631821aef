//! Month-view calendar construction.
//!
//! Occupancy and time-off are independent ledgers. A person who is both
//! occupied and on time-off on a day is reported as `time_off`, while the
//! occupancy record for that day stays untouched.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{Department, Person, Task, TimeOffMap};

use super::dates::{days_inclusive, epoch_to_local_date, month_bounds};
use super::occupancy::OccupancyStore;

/// A person's status on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Neither occupied nor on time-off.
    Available,
    /// Already assigned by prior scheduling.
    Occupied,
    /// On approved time-off. Reported over `Occupied`.
    TimeOff,
}

/// One day of the month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    /// The calendar day.
    pub date: NaiveDate,
    /// Status of every known person.
    pub statuses: BTreeMap<String, DayStatus>,
    /// Active task identifiers per department.
    pub active_tasks: BTreeMap<String, Vec<String>>,
}

/// Per-status day counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Days available.
    pub available: u32,
    /// Days occupied.
    pub occupied: u32,
    /// Days on time-off.
    pub time_off: u32,
}

impl StatusCounts {
    fn record(&mut self, status: DayStatus) {
        match status {
            DayStatus::Available => self.available += 1,
            DayStatus::Occupied => self.occupied += 1,
            DayStatus::TimeOff => self.time_off += 1,
        }
    }
}

/// A flat summary of the month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    /// Number of people in the view.
    pub people: usize,
    /// Number of days in the view.
    pub days: usize,
    /// Person-day totals across the month.
    pub totals: StatusCounts,
    /// Person-day totals per person.
    pub per_person: BTreeMap<String, StatusCounts>,
}

/// A day-by-day view of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// First day of the month.
    pub first_day: NaiveDate,
    /// Last day of the month.
    pub last_day: NaiveDate,
    /// Hour offset used to pick the month.
    pub tz_offset_hours: i32,
    /// One entry per day, in order.
    pub days: Vec<DayView>,
    /// Flat summary.
    pub summary: CalendarSummary,
}

/// Returns the first and last day of the month containing `now_epoch` under
/// a fixed hour offset.
pub fn target_month(now_epoch: i64, tz_offset_hours: i32) -> EngineResult<(NaiveDate, NaiveDate)> {
    Ok(month_bounds(epoch_to_local_date(now_epoch, tz_offset_hours)?))
}

/// Builds the month view for the month containing `now_epoch`.
///
/// Known people are the directory `people` plus anyone with an occupancy
/// record or a time-off entry within the month. Inputs are not modified.
pub fn build_month_view(
    occupancy: &OccupancyStore,
    now_epoch: i64,
    time_off: &TimeOffMap,
    tz_offset_hours: i32,
    people: &[Person],
    departments: &[Department],
    tasks: &[Task],
) -> EngineResult<MonthView> {
    let (first_day, last_day) = target_month(now_epoch, tz_offset_hours)?;

    let mut known: BTreeSet<&str> = people.iter().map(|p| p.id.as_str()).collect();
    known.extend(occupancy.people());
    known.extend(
        time_off
            .range(first_day..=last_day)
            .flat_map(|(_, ids)| ids.iter().map(String::as_str)),
    );

    let department_ids: BTreeSet<&str> = departments.iter().map(|d| d.id.as_str()).collect();
    let no_absences = BTreeSet::new();

    let mut summary = CalendarSummary {
        people: known.len(),
        ..Default::default()
    };
    let mut days = Vec::new();

    for date in days_inclusive(first_day, last_day) {
        let absent = time_off.get(&date).unwrap_or(&no_absences);

        let mut statuses = BTreeMap::new();
        for person_id in &known {
            let status = if absent.contains(*person_id) {
                DayStatus::TimeOff
            } else if occupancy.is_occupied(person_id, date) {
                DayStatus::Occupied
            } else {
                DayStatus::Available
            };
            summary.totals.record(status);
            summary
                .per_person
                .entry(person_id.to_string())
                .or_default()
                .record(status);
            statuses.insert(person_id.to_string(), status);
        }

        let mut active_tasks: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for task in tasks.iter().filter(|t| t.is_active_on(date)) {
            if department_ids.contains(task.department_id.as_str()) {
                active_tasks
                    .entry(task.department_id.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }

        days.push(DayView {
            date,
            statuses,
            active_tasks,
        });
    }
    summary.days = days.len();

    Ok(MonthView {
        year: first_day.year(),
        month: first_day.month(),
        first_day,
        last_day,
        tz_offset_hours,
        days,
        summary,
    })
}

/// Returns a copy of `occupancy` with every task assignee marked occupied on
/// each day of `[first_day, last_day]` where their task is active and they
/// are not on time-off. Assignees missing from `people` are skipped.
pub fn record_task_assignments(
    occupancy: &OccupancyStore,
    first_day: NaiveDate,
    last_day: NaiveDate,
    time_off: &TimeOffMap,
    people: &[Person],
    tasks: &[Task],
) -> OccupancyStore {
    let known: BTreeSet<&str> = people.iter().map(|p| p.id.as_str()).collect();
    let mut updated = occupancy.clone();

    for date in days_inclusive(first_day, last_day) {
        let absent = time_off.get(&date);
        for task in tasks.iter().filter(|t| t.is_active_on(date)) {
            for person_id in &task.assigned_to {
                let on_leave = absent.is_some_and(|ids| ids.contains(person_id));
                if known.contains(person_id.as_str()) && !on_leave {
                    updated.mark_occupied(person_id, date);
                }
            }
        }
    }
    updated
}
