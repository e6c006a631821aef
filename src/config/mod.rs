//! Configuration loading for the PTO engine.
//!
//! A configuration profile is a directory holding engine settings and a
//! static personnel/task directory.
//!
//! # Example
//!
//! ```no_run
//! use pto_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/acme").unwrap();
//! println!("timeout: {:?}", config.collaborator_timeout());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, EngineSettings, MAX_TZ_OFFSET_HOURS, MIN_TZ_OFFSET_HOURS};
