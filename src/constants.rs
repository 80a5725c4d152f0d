// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Thresholds and fixed coefficients of the training engine. These values are
//! part of each function's contract: they decide whether a caller gets a
//! result at all.

/// Sample filters and minimum data requirements for stream metrics
pub mod stream {
    /// Samples slower than this are treated as stopped (m/s)
    pub const MIN_VALID_VELOCITY: f64 = 0.5;

    /// Heart rate must be strictly above this to count (bpm)
    pub const MIN_VALID_HR: u32 = 80;

    /// Heart rate must be strictly below this to count (bpm)
    pub const MAX_VALID_HR: u32 = 220;

    /// Converts m/s to m/min in the efficiency factor
    pub const SECONDS_PER_MINUTE: f64 = 60.0;

    /// Grade factor = 1 + coefficient x grade fraction
    pub const GRADE_FACTOR_COEFFICIENT: f64 = 3.0;
    pub const GRADE_FACTOR_MIN: f64 = 0.5;
    pub const GRADE_FACTOR_MAX: f64 = 3.0;

    /// Qualifying samples needed for pace at heart rate
    pub const MIN_PACE_AT_HR_SAMPLES: usize = 30;

    /// Recorded time needed for aerobic decoupling (seconds)
    pub const MIN_DECOUPLING_SECONDS: u32 = 120;

    /// Recorded time needed for cardiac drift (seconds)
    pub const MIN_DRIFT_SECONDS: u32 = 240;

    /// Steady-state samples needed for cardiac drift
    pub const MIN_STEADY_STATE_SAMPLES: usize = 20;

    /// Pace band around the average counted as steady state (fraction)
    pub const STEADY_STATE_PACE_TOLERANCE: f64 = 0.10;

    /// Heart rates (bpm) pace is reported at: easy, moderate, threshold
    pub const DEFAULT_PACE_HR_BANDS: [u32; 3] = [140, 155, 170];

    /// Heart-rate tolerance around each band (bpm)
    pub const DEFAULT_PACE_HR_TOLERANCE: u32 = 5;
}

/// Training load model
pub mod load {
    /// Banister exponential coefficient (male default)
    pub const BANISTER_COEFFICIENT: f64 = 1.92;

    /// TRIMP of the reference effort used to normalize HRSS
    pub const HRSS_REFERENCE_TRIMP: f64 = 100.0;

    /// Long trend (fitness) window in days
    pub const FITNESS_WINDOW_DAYS: u32 = 42;

    /// Short trend (fatigue) window in days
    pub const FATIGUE_WINDOW_DAYS: u32 = 7;

    /// Balance below this is overreaching
    pub const BALANCE_OVERREACHING: f64 = -10.0;

    /// Balance above this is detraining
    pub const BALANCE_DETRAINING: f64 = 10.0;
}

/// Best-effort search
pub mod effort {
    /// Samples carrying a distance reading needed for a search
    pub const MIN_DISTANCE_POINTS: usize = 10;

    /// Heart-rate readings at or below this are dropped-sensor zeros
    pub const MIN_SEGMENT_HR: u32 = 50;
}

/// Personal record detection
pub mod records {
    /// Whole-activity distance tolerance for race categories (fraction)
    pub const RACE_MATCH_TOLERANCE: f64 = 0.03;

    /// Shortest activity eligible for the fastest-pace record (meters)
    pub const FASTEST_PACE_MIN_DISTANCE: f64 = 3000.0;
}

/// Race prediction and confidence heuristic
pub mod prediction {
    /// Distance tolerance for matching a pace-table column (fraction)
    pub const DISTANCE_MATCH_TOLERANCE: f64 = 0.05;

    /// Records older than this are not used as a prediction source
    pub const RECORD_MAX_AGE_DAYS: i64 = 365;

    /// Distance-ratio tiers: (ratio strictly above, multiplier)
    pub const RATIO_PENALTIES: [(f64, f64); 3] = [(4.0, 0.70), (2.0, 0.85), (1.5, 0.95)];

    /// Record-age tiers: (days strictly above, multiplier)
    pub const AGE_PENALTIES: [(i64, f64); 3] = [(180, 0.75), (90, 0.90), (30, 0.95)];

    /// Efficiency trend (percent) below which fitness is flagged as declining
    pub const EFFICIENCY_DECLINE_PCT: f64 = -5.0;
    pub const EFFICIENCY_DECLINE_PENALTY: f64 = 0.85;

    pub const CONFIDENCE_HIGH: f64 = 0.85;
    pub const CONFIDENCE_MEDIUM: f64 = 0.65;

    /// Window length of each half of the efficiency trend (days)
    pub const EFFICIENCY_TREND_WINDOW_DAYS: i64 = 28;

    /// Efficiency samples needed in each trend window
    pub const MIN_EFFICIENCY_SAMPLES: usize = 3;
}

/// Unit conversions
pub mod units {
    pub const METERS_PER_KILOMETER: f64 = 1000.0;
    pub const METERS_PER_MILE: f64 = 1609.344;
}

/// Environment variables and file names read by the configuration layer
pub mod env_config {
    pub const RESTING_HR: &str = "ATHLETE_RESTING_HR";
    pub const MAX_HR: &str = "ATHLETE_MAX_HR";
    pub const LTHR: &str = "ATHLETE_LTHR";
    pub const DISPLAY_UNITS: &str = "DISPLAY_UNITS";

    pub const LOG_LEVEL: &str = "RUST_LOG";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_INCLUDE_LOCATION: &str = "LOG_INCLUDE_LOCATION";
    pub const LOG_INCLUDE_SPANS: &str = "LOG_INCLUDE_SPANS";

    /// Directory under the platform config dir
    pub const CONFIG_DIR_NAME: &str = "pierre-training-engine";
    pub const CONFIG_FILE_NAME: &str = "athlete.toml";
}
