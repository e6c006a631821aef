//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and the static directory from YAML files.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::store::StaticDirectory;

use super::types::{EngineConfig, EngineSettings};

/// Loads and provides access to an engine configuration profile.
///
/// # Directory Structure
///
/// ```text
/// config/acme/
/// ├── engine.yaml     # Engine settings
/// └── directory.yaml  # People, departments and tasks
/// ```
///
/// # Example
///
/// ```no_run
/// use pto_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/acme").unwrap();
/// println!("{} people", loader.directory().people.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails with [`EngineError::ConfigNotFound`] if either file is missing
    /// and [`EngineError::ConfigParseError`] if either file is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;
        Self::validate_settings(&settings, &engine_path)?;

        let directory_path = path.join("directory.yaml");
        let directory = Self::load_yaml::<StaticDirectory>(&directory_path)?;

        Ok(Self {
            config: EngineConfig {
                settings,
                directory,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_settings(settings: &EngineSettings, path: &Path) -> EngineResult<()> {
        if !EngineSettings::is_valid_tz_offset(settings.default_tz_offset_hours) {
            return Err(EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: format!(
                    "default_tz_offset_hours {} is outside [-12, 14]",
                    settings.default_tz_offset_hours
                ),
            });
        }
        Ok(())
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.config.settings
    }

    /// Returns the static directory.
    pub fn directory(&self) -> &StaticDirectory {
        &self.config.directory
    }

    /// Returns the collaborator timeout.
    pub fn collaborator_timeout(&self) -> Duration {
        self.config.settings.collaborator_timeout()
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
