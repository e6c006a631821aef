//! PTO-aware staffing feasibility and schedule-merge engine.
//!
//! This crate combines per-person occupancy history, centrally stored
//! approved time-off and ad hoc overrides to produce month-view staffing
//! calendars and to decide whether time-off requests can be granted without
//! breaking departmental staffing minimums or skill coverage.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod scheduling;
pub mod service;
pub mod store;
