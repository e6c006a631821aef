//! Time-off entries and the effective time-off map.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Approval status of a time-off entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffStatus {
    /// Requested, not yet decided.
    Pending,
    /// Approved; the only status that affects staffing.
    Approved,
    /// Denied or withdrawn.
    Denied,
}

/// A single day of time-off for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffEntry {
    /// The absent person.
    pub person_id: String,
    /// The calendar date of the absence.
    pub date: NaiveDate,
    /// Approval status.
    pub status: TimeOffStatus,
}

impl TimeOffEntry {
    /// Creates an approved entry.
    pub fn approved(person_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            person_id: person_id.into(),
            date,
            status: TimeOffStatus::Approved,
        }
    }
}

/// Date to set of absent person identifiers.
///
/// Derived per evaluation and never persisted. Ordered so that output and
/// iteration are deterministic.
pub type TimeOffMap = BTreeMap<NaiveDate, BTreeSet<String>>;

/// Groups `(person_id, date)` pairs into a [`TimeOffMap`].
///
/// # Examples
///
/// ```
/// use pto_engine::models::time_off_map_from_entries;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
/// let map = time_off_map_from_entries(vec![
///     ("p1".to_string(), day),
///     ("p2".to_string(), day),
///     ("p1".to_string(), day),
/// ]);
/// assert_eq!(map[&day].len(), 2);
/// ```
pub fn time_off_map_from_entries<I>(entries: I) -> TimeOffMap
where
    I: IntoIterator<Item = (String, NaiveDate)>,
{
    let mut map = TimeOffMap::new();
    for (person_id, date) in entries {
        map.entry(date).or_default().insert(person_id);
    }
    map
}
