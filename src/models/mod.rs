//! Core data models for the PTO engine.
//!
//! This module contains the directory records (people, departments, tasks)
//! and the time-off types consumed by the scheduling components.

mod department;
mod person;
mod task;
mod time_off;

pub use department::Department;
pub use person::{Person, Role};
pub use task::{Task, TaskStatus};
pub use time_off::{TimeOffEntry, TimeOffMap, TimeOffStatus, time_off_map_from_entries};
