// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the training engine
//!
//! Resolution order: explicit path, then the platform config directory, then
//! built-in defaults. Environment overrides are applied on top and the result
//! is validated. The engine never reads configuration itself; callers pass
//! the resolved values in.

pub mod athlete_config;
pub mod environment;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

pub use athlete_config::{AnalysisConfig, AthleteConfig, HeartRateConfig};

use crate::constants::env_config::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Resting heart rate ({resting}) must be below max heart rate ({max})")]
    HeartRateOrder { resting: u32, max: u32 },

    #[error("Lactate threshold ({lthr}) must be above resting ({resting}) and at most max ({max})")]
    LactateThreshold { lthr: u32, resting: u32, max: u32 },

    #[error("Fatigue window ({fatigue} days) must be non-zero and shorter than the fitness window ({fitness} days)")]
    LoadWindows { fitness: u32, fatigue: u32 },

    #[error("Heart-rate band tolerance must be positive")]
    ZeroTolerance,

    #[error("Record max age must be positive, got {0} days")]
    RecordMaxAge(i64),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Default location of the athlete config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

pub struct Config;

impl Config {
    /// Resolve, override and validate the athlete configuration
    pub fn load(path: Option<String>) -> Result<AthleteConfig> {
        let mut config = match path {
            Some(explicit) => AthleteConfig::load_from_file(&explicit)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    AthleteConfig::load_from_file(&default_path)?
                } else {
                    info!("No athlete config file found, using defaults");
                    AthleteConfig::default()
                }
            }
        };

        environment::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to `path` or the default location
    pub fn save(config: &AthleteConfig, path: Option<String>) -> Result<()> {
        let path = path.map_or_else(default_config_path, PathBuf::from);
        config.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_path_ends_with_file_name() {
        let path = default_config_path();
        assert!(path.ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_explicit_path() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[heart_rate]\nresting_hr = 52\nmax_hr = 188")?;

        let config = Config::load(Some(temp_file.path().to_string_lossy().to_string()))?;
        assert_eq!(config.heart_rate.resting_hr, 52);
        assert_eq!(config.heart_rate.max_hr, 188);
        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[heart_rate]\nresting_hr = 200\nmax_hr = 180")?;

        let error = Config::load(Some(temp_file.path().to_string_lossy().to_string())).unwrap_err();
        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::HeartRateOrder {
                resting: 200,
                max: 180
            })
        );
        Ok(())
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        assert!(Config::load(Some("/nonexistent/athlete.toml".to_string())).is_err());
    }

    #[test]
    fn test_save_to_explicit_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("athlete.toml");

        Config::save(&AthleteConfig::default(), Some(path.to_string_lossy().to_string()))?;
        assert_eq!(AthleteConfig::load_from_file(&path)?, AthleteConfig::default());
        Ok(())
    }
}
