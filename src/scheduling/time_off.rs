//! Time-off resolution.
//!
//! Combines approved entries from the central store with a caller-supplied
//! override map. [`merge`] is the only place the two sources meet; the
//! calendar builder and the feasibility evaluator both consume its output.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{TimeOffMap, time_off_map_from_entries};
use crate::store::{TimeOffStore, with_timeout};

/// An effective time-off map together with whether it is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimeOff {
    /// The effective map.
    pub map: TimeOffMap,
    /// True if the global fetch failed and `map` holds only the overrides.
    pub degraded: bool,
}

/// Unions two time-off maps date by date.
///
/// A `(person, date)` pair present in both maps appears once in the result.
///
/// # Examples
///
/// ```
/// use pto_engine::models::time_off_map_from_entries;
/// use pto_engine::scheduling::merge;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
/// let global = time_off_map_from_entries(vec![("p1".to_string(), day)]);
/// let extra = time_off_map_from_entries(vec![("p1".to_string(), day), ("p2".to_string(), day)]);
///
/// let merged = merge(&global, &extra);
/// assert_eq!(merged[&day].len(), 2);
/// ```
pub fn merge(global_map: &TimeOffMap, additional_map: &TimeOffMap) -> TimeOffMap {
    let mut merged = global_map.clone();
    for (date, people) in additional_map {
        merged
            .entry(*date)
            .or_default()
            .extend(people.iter().cloned());
    }
    merged
}

/// Drops every date outside `[start_date, end_date]` and every empty day.
pub fn restrict_to_range(map: &TimeOffMap, start_date: NaiveDate, end_date: NaiveDate) -> TimeOffMap {
    if start_date > end_date {
        return TimeOffMap::new();
    }
    map.range(start_date..=end_date)
        .filter(|(_, people)| !people.is_empty())
        .map(|(date, people)| (*date, people.clone()))
        .collect()
}

/// Resolves effective time-off against a [`TimeOffStore`].
pub struct TimeOffResolver<'a, S> {
    store: &'a S,
    timeout: Duration,
}

impl<'a, S: TimeOffStore> TimeOffResolver<'a, S> {
    /// Creates a resolver whose store calls are bounded by `timeout`.
    pub fn new(store: &'a S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetches approved time-off in `[start_date, end_date]` from the store.
    ///
    /// Never fails: if the store is unavailable or times out, a warning is
    /// logged and an empty, degraded map is returned.
    pub async fn fetch_global(&self, start_date: NaiveDate, end_date: NaiveDate) -> ResolvedTimeOff {
        let call = self.store.query_approved(start_date, end_date);
        match with_timeout("query_approved", self.timeout, call).await {
            Ok(entries) => {
                debug!(
                    start_date = %start_date,
                    end_date = %end_date,
                    entries = entries.len(),
                    "Fetched global time-off"
                );
                let map = time_off_map_from_entries(entries);
                ResolvedTimeOff {
                    map: restrict_to_range(&map, start_date, end_date),
                    degraded: false,
                }
            }
            Err(err) => {
                warn!(
                    start_date = %start_date,
                    end_date = %end_date,
                    error = %err,
                    "Global time-off unavailable, continuing with overrides only"
                );
                ResolvedTimeOff {
                    map: TimeOffMap::new(),
                    degraded: true,
                }
            }
        }
    }

    /// Produces the effective time-off map for a range.
    ///
    /// With `use_global` off the store is not consulted and the overrides are
    /// returned as-is, restricted to the range.
    pub async fn resolve(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        additional_map: &TimeOffMap,
        use_global: bool,
    ) -> ResolvedTimeOff {
        if !use_global {
            return ResolvedTimeOff {
                map: restrict_to_range(additional_map, start_date, end_date),
                degraded: false,
            };
        }

        let global = self.fetch_global(start_date, end_date).await;
        ResolvedTimeOff {
            map: restrict_to_range(&merge(&global.map, additional_map), start_date, end_date),
            degraded: global.degraded,
        }
    }
}
