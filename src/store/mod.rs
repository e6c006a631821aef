//! External collaborators consumed by the engine.
//!
//! The engine never owns a database connection. Callers inject a
//! [`TimeOffStore`] and a [`Directory`] into every operation that needs them;
//! their lifecycle belongs to the enclosing service.

mod directory;
mod memory;
mod time_off_store;

pub use directory::{Directory, StaticDirectory};
pub use memory::InMemoryTimeOffStore;
pub use time_off_store::{TimeOffStore, with_timeout};
