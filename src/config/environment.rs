// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment overrides for the athlete configuration

use std::env;
use std::str::FromStr;
use tracing::{debug, info};

use super::{AthleteConfig, ConfigError};
use crate::constants::env_config;
use crate::models::DistanceUnit;

/// Apply overrides from the process environment, after loading `.env`
pub fn apply_env_overrides(config: &mut AthleteConfig) -> Result<(), ConfigError> {
    if let Err(e) = dotenv::dotenv() {
        debug!("No .env file loaded: {}", e);
    }
    apply_overrides(config, |key| env::var(key).ok())
}

/// Apply overrides from an arbitrary key lookup
///
/// Blank values are ignored. An unparsable value is an error rather than a
/// silent fallback to the file or default value.
pub fn apply_overrides(
    config: &mut AthleteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(raw) = value(env_config::RESTING_HR) {
        config.heart_rate.resting_hr = parse_var(env_config::RESTING_HR, &raw)?;
    }
    if let Some(raw) = value(env_config::MAX_HR) {
        config.heart_rate.max_hr = parse_var(env_config::MAX_HR, &raw)?;
    }
    if let Some(raw) = value(env_config::LTHR) {
        config.heart_rate.lthr = Some(parse_var(env_config::LTHR, &raw)?);
    }
    if let Some(raw) = value(env_config::DISPLAY_UNITS) {
        config.units = raw
            .parse::<DistanceUnit>()
            .map_err(|_| invalid(env_config::DISPLAY_UNITS, &raw))?;
    }

    info!("{}", summary(config));
    Ok(())
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    }
}

/// One-line summary of the effective configuration for logging
pub fn summary(config: &AthleteConfig) -> String {
    format!(
        "Athlete configuration: resting {} bpm, max {} bpm, LTHR {}, units {:?}, load windows {}/{} days",
        config.heart_rate.resting_hr,
        config.heart_rate.max_hr,
        config
            .heart_rate
            .lthr
            .map_or_else(|| "unset".to_string(), |lthr| format!("{lthr} bpm")),
        config.units,
        config.analysis.fitness_window_days,
        config.analysis.fatigue_window_days,
    )
}
