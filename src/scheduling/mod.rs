//! Scheduling logic for the PTO engine.
//!
//! This module contains the occupancy store, time-off resolution, staffing
//! feasibility evaluation, month-view calendar construction and the strict
//! two-phase approval flow.

mod approval;
mod calendar;
mod dates;
mod feasibility;
mod occupancy;
mod time_off;

pub use approval::{
    ApprovalOutcome, ApprovalRequest, ApprovalState, CommitFailure, CommitReceipt, CommitToken,
    commit, evaluate_request,
};
pub use calendar::{
    CalendarSummary, DayStatus, DayView, MonthView, StatusCounts, build_month_view,
    record_task_assignments, target_month,
};
pub use dates::{days_inclusive, epoch_to_local_date, month_bounds};
pub use feasibility::{
    FeasibilityReport, StaffingContext, Violation, ViolationReason, evaluate_staffing,
};
pub use occupancy::{OccupancyInput, OccupancyStore};
pub use time_off::{ResolvedTimeOff, TimeOffResolver, merge, restrict_to_range};
