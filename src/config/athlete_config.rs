// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Athlete heart-rate anchors, display units and analysis parameters

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ConfigError;
use crate::constants::load::{FATIGUE_WINDOW_DAYS, FITNESS_WINDOW_DAYS};
use crate::constants::prediction::RECORD_MAX_AGE_DAYS;
use crate::constants::stream::{DEFAULT_PACE_HR_BANDS, DEFAULT_PACE_HR_TOLERANCE};
use crate::models::{DistanceUnit, HrZones};

/// Main athlete configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteConfig {
    /// Pace denominator and display unit
    pub units: DistanceUnit,
    pub heart_rate: HeartRateConfig,
    pub analysis: AnalysisConfig,
}

/// Heart-rate anchors of the athlete
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateConfig {
    pub resting_hr: u32,
    pub max_hr: u32,
    /// Lactate-threshold heart rate
    pub lthr: Option<u32>,
}

/// Tunable analysis parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Heart rates pace is reported at (low, mid, high)
    pub pace_hr_bands: [u32; 3],
    /// Tolerance around each band (bpm)
    pub pace_hr_tolerance: u32,
    pub fitness_window_days: u32,
    pub fatigue_window_days: u32,
    /// Oldest record usable for race prediction
    pub record_max_age_days: i64,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            resting_hr: 60,
            max_hr: 190,
            lthr: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pace_hr_bands: DEFAULT_PACE_HR_BANDS,
            pace_hr_tolerance: DEFAULT_PACE_HR_TOLERANCE,
            fitness_window_days: FITNESS_WINDOW_DAYS,
            fatigue_window_days: FATIGUE_WINDOW_DAYS,
            record_max_age_days: RECORD_MAX_AGE_DAYS,
        }
    }
}

impl AthleteConfig {
    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read athlete config file: {}", path.display()))?;

        let config: AthleteConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse athlete config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize athlete config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write athlete config file: {}", path.display()))?;
        Ok(())
    }

    /// Check the cross-field constraints of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let HeartRateConfig {
            resting_hr,
            max_hr,
            lthr,
        } = self.heart_rate;

        if resting_hr >= max_hr {
            return Err(ConfigError::HeartRateOrder {
                resting: resting_hr,
                max: max_hr,
            });
        }
        if let Some(lthr) = lthr {
            if lthr <= resting_hr || lthr > max_hr {
                return Err(ConfigError::LactateThreshold {
                    lthr,
                    resting: resting_hr,
                    max: max_hr,
                });
            }
        }

        let analysis = &self.analysis;
        if analysis.fatigue_window_days == 0
            || analysis.fatigue_window_days >= analysis.fitness_window_days
        {
            return Err(ConfigError::LoadWindows {
                fitness: analysis.fitness_window_days,
                fatigue: analysis.fatigue_window_days,
            });
        }
        if analysis.pace_hr_tolerance == 0 {
            return Err(ConfigError::ZeroTolerance);
        }
        if analysis.record_max_age_days <= 0 {
            return Err(ConfigError::RecordMaxAge(analysis.record_max_age_days));
        }

        Ok(())
    }

    /// Heart-rate anchors handed to the engine
    pub fn hr_zones(&self) -> HrZones {
        HrZones {
            resting_hr: self.heart_rate.resting_hr,
            max_hr: self.heart_rate.max_hr,
            lactate_threshold_hr: self.heart_rate.lthr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_athlete_config() {
        let config = AthleteConfig::default();

        assert_eq!(config.units, DistanceUnit::Kilometers);
        assert_eq!(config.analysis.fitness_window_days, 42);
        assert_eq!(config.analysis.fatigue_window_days, 7);
        assert_eq!(config.analysis.record_max_age_days, 365);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            r#"
units = "miles"

[heart_rate]
resting_hr = 48
max_hr = 186
lthr = 168

[analysis]
pace_hr_bands = [135, 150, 165]
pace_hr_tolerance = 4
"#
        )?;

        let config = AthleteConfig::load_from_file(temp_file.path())?;

        assert_eq!(config.units, DistanceUnit::Miles);
        assert_eq!(config.heart_rate.lthr, Some(168));
        assert_eq!(config.analysis.pace_hr_bands, [135, 150, 165]);
        assert_eq!(config.analysis.pace_hr_tolerance, 4);
        // Unset keys keep their defaults
        assert_eq!(config.analysis.fitness_window_days, 42);
        assert_eq!(
            config.hr_zones(),
            HrZones {
                resting_hr: 48,
                max_hr: 186,
                lactate_threshold_hr: Some(168),
            }
        );

        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[heart_rate]\nresting_hr = \"fifty\"")?;

        let error = AthleteConfig::load_from_file(temp_file.path()).unwrap_err();
        assert!(error.to_string().contains("Failed to parse athlete config file"));
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested/athlete.toml");

        let mut config = AthleteConfig::default();
        config.heart_rate.lthr = Some(172);
        config.save(&path)?;

        assert_eq!(AthleteConfig::load_from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_validation_rules() {
        let mut config = AthleteConfig::default();
        config.heart_rate.resting_hr = 190;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HeartRateOrder { .. })
        ));

        let mut config = AthleteConfig::default();
        config.heart_rate.lthr = Some(195);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LactateThreshold { .. })
        ));
        config.heart_rate.lthr = Some(190);
        assert!(config.validate().is_ok());

        let mut config = AthleteConfig::default();
        config.analysis.fatigue_window_days = 42;
        assert_eq!(
            config.validate(),
            Err(ConfigError::LoadWindows {
                fitness: 42,
                fatigue: 42
            })
        );

        let mut config = AthleteConfig::default();
        config.analysis.pace_hr_tolerance = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTolerance));
    }
}
