//! Calendar date helpers.
//!
//! Epoch-to-date conversion uses a fixed hour offset applied by plain
//! addition before truncating to a date; there are no named time zones.

use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Converts epoch seconds to a calendar date under a fixed hour offset.
///
/// # Examples
///
/// ```
/// use pto_engine::scheduling::epoch_to_local_date;
/// use chrono::NaiveDate;
///
/// // 2024-12-01T02:00:00Z
/// let epoch = 1_733_018_400;
/// assert_eq!(
///     epoch_to_local_date(epoch, 0).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
/// );
/// // Five hours west of UTC it is still November 30th.
/// assert_eq!(
///     epoch_to_local_date(epoch, -5).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()
/// );
/// ```
pub fn epoch_to_local_date(now_epoch: i64, tz_offset_hours: i32) -> EngineResult<NaiveDate> {
    let shifted = i64::from(tz_offset_hours)
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|offset| now_epoch.checked_add(offset))
        .ok_or_else(|| EngineError::invalid_request("now_epoch", "timestamp out of range"))?;

    DateTime::from_timestamp(shifted, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| EngineError::invalid_request("now_epoch", "timestamp out of range"))
}

/// Returns the first and last calendar day of the month containing `date`.
///
/// # Examples
///
/// ```
/// use pto_engine::scheduling::month_bounds;
/// use chrono::NaiveDate;
///
/// let (first, last) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
/// assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Iterates every day in `[start, end]`, in order. Empty if `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |day| day.succ_opt()).take_while(move |day| *day <= end)
}
