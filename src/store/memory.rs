//! In-memory time-off store for local runs and tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::error::EngineResult;
use crate::models::{TimeOffEntry, TimeOffStatus};

use super::TimeOffStore;

/// A [`TimeOffStore`] backed by a lock-protected map.
///
/// Entries are keyed by `(person_id, date)`, so the pair is unique by
/// construction and a later entry for the same pair replaces the status of
/// the earlier one.
#[derive(Debug, Default)]
pub struct InMemoryTimeOffStore {
    entries: RwLock<BTreeMap<(String, NaiveDate), TimeOffStatus>>,
}

impl InMemoryTimeOffStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with entries of any status.
    ///
    /// # Examples
    ///
    /// ```
    /// use pto_engine::models::{TimeOffEntry, TimeOffStatus};
    /// use pto_engine::store::InMemoryTimeOffStore;
    /// use chrono::NaiveDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
    /// let store = InMemoryTimeOffStore::with_entries(vec![
    ///     TimeOffEntry { person_id: "p1".into(), date: day, status: TimeOffStatus::Pending },
    ///     TimeOffEntry::approved("p1", day),
    /// ]);
    /// assert_eq!(store.len(), 1);
    /// assert_eq!(store.status_of("p1", day), Some(TimeOffStatus::Approved));
    /// ```
    pub fn with_entries(entries: impl IntoIterator<Item = TimeOffEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.write();
            for entry in entries {
                map.insert((entry.person_id, entry.date), entry.status);
            }
        }
        store
    }

    /// Returns the status recorded for a pair, if any.
    pub fn status_of(&self, person_id: &str, date: NaiveDate) -> Option<TimeOffStatus> {
        self.entries
            .read()
            .get(&(person_id.to_string(), date))
            .copied()
    }

    /// Returns a snapshot of every entry.
    pub fn entries(&self) -> Vec<TimeOffEntry> {
        self.entries
            .read()
            .iter()
            .map(|((person_id, date), status)| TimeOffEntry {
                person_id: person_id.clone(),
                date: *date,
                status: *status,
            })
            .collect()
    }

    /// Number of stored entries regardless of status.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TimeOffStore for InMemoryTimeOffStore {
    async fn query_approved(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Vec<(String, NaiveDate)>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|((_, date), status)| {
                **status == TimeOffStatus::Approved && *date >= start_date && *date <= end_date
            })
            .map(|((person_id, date), _)| (person_id.clone(), *date))
            .collect())
    }

    async fn insert_approved(&self, person_id: &str, date: NaiveDate) -> EngineResult<bool> {
        let mut entries = self.entries.write();
        let previous = entries.insert((person_id.to_string(), date), TimeOffStatus::Approved);
        Ok(previous != Some(TimeOffStatus::Approved))
    }

    async fn delete(&self, person_id: &str, date: NaiveDate) -> EngineResult<bool> {
        let mut entries = self.entries.write();
        Ok(entries.remove(&(person_id.to_string(), date)).is_some())
    }

    async fn lookup(&self, person_id: &str, date: NaiveDate) -> EngineResult<Option<TimeOffStatus>> {
        Ok(self.status_of(person_id, date))
    }

    async fn restore(
        &self,
        person_id: &str,
        date: NaiveDate,
        status: TimeOffStatus,
    ) -> EngineResult<()> {
        self.entries
            .write()
            .insert((person_id.to_string(), date), status);
        Ok(())
    }
}
