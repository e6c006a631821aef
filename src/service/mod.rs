//! Caller-facing operations of the PTO engine.
//!
//! [`SchedulingEngine`] exposes the month schedule, time-off evaluation and
//! time-off management operations consumed by an enclosing service layer.

mod engine;
mod request;
mod response;

pub use engine::SchedulingEngine;
pub use request::{MonthScheduleRequest, PtoRequest, TimeOffAction, TimeOffCommand};
pub use response::{
    MonthScheduleResponse, OperationError, PersistenceStatus, PtoDecision, TimeOffResult,
};
