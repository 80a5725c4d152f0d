// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Plain in-memory records exchanged between the training engine and its
//! storage collaborator. Nothing in here performs I/O.
//!
//! ## Design Principles
//!
//! - **Optional sensors**: every stream channel except time may be missing
//! - **Absent is not zero**: derived metrics are `Option<f64>`, `None` means
//!   "not computed" and `Some(0.0)` is a real result
//! - **Serializable**: all models round-trip through JSON for storage
//!
//! ## Core Models
//!
//! - [`StreamPoint`]: one sample of a recorded activity stream
//! - [`Activity`]: summary of a single workout
//! - [`ActivityMetrics`]: derived per-activity metrics
//! - [`PersonalRecord`]: the live record for one [`RecordCategory`]
//! - [`FitnessMetrics`]: one row of the day-by-day fitness trend
//! - [`RacePrediction`]: predicted time for a standard distance

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::units::{METERS_PER_KILOMETER, METERS_PER_MILE};

/// A single sample of an activity stream
///
/// Samples are ordered by `time_offset`; `distance_meters`, where present,
/// never decreases within one activity.
///
/// # Examples
///
/// ```rust
/// use pierre_training_engine::models::StreamPoint;
///
/// let point = StreamPoint {
///     velocity_mps: Some(3.0),
///     heart_rate: Some(150),
///     cadence: Some(88),
///     ..StreamPoint::at(120)
/// };
/// assert_eq!(point.steps_per_minute(), Some(176));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamPoint {
    /// Seconds since the start of the activity
    pub time_offset: u32,
    /// Cumulative distance in meters
    pub distance_meters: Option<f64>,
    /// Instantaneous velocity in meters per second
    pub velocity_mps: Option<f64>,
    /// Heart rate in beats per minute
    pub heart_rate: Option<u32>,
    /// Cadence as reported by the provider (single leg, steps per minute)
    pub cadence: Option<u32>,
    /// Grade in percent (positive is uphill)
    pub grade_percent: Option<f64>,
}

impl StreamPoint {
    /// Create a sample carrying only a time offset
    pub fn at(time_offset: u32) -> Self {
        Self {
            time_offset,
            ..Self::default()
        }
    }

    /// Cadence normalized to both legs
    pub fn steps_per_minute(&self) -> Option<u32> {
        self.cadence.map(|c| c.saturating_mul(2))
    }
}

/// Sport of an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Road or track running
    Run,
    /// Trail running
    TrailRun,
    /// Treadmill running
    VirtualRun,
    /// Walking
    Walk,
    /// Hiking
    Hike,
    /// Cycling
    Ride,
    /// Provider sport type with no dedicated variant
    Other(String),
}

impl SportType {
    /// Whether this sport counts towards running records
    pub fn is_run(&self) -> bool {
        matches!(self, Self::Run | Self::TrailRun | Self::VirtualRun)
    }
}

/// Summary of a single recorded activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier for the activity (provider-specific)
    pub id: String,
    /// Human-readable name/title of the activity
    pub name: String,
    /// Type of sport
    pub sport_type: SportType,
    /// When the activity started (UTC)
    pub start_date: DateTime<Utc>,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_time_seconds: u32,
    /// Total elevation gained in meters
    pub elevation_gain: Option<f64>,
    /// Summary average heart rate (BPM)
    pub average_heart_rate: Option<u32>,
    /// Summary average cadence (single leg)
    pub average_cadence: Option<u32>,
}

impl Activity {
    /// Calendar day the activity started on
    pub fn date(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    /// Whole-activity pace in seconds per kilometer
    pub fn average_pace_seconds_per_km(&self) -> Option<f64> {
        if self.distance_meters <= 0.0 || self.moving_time_seconds == 0 {
            return None;
        }
        Some(f64::from(self.moving_time_seconds) / (self.distance_meters / METERS_PER_KILOMETER))
    }
}

/// Athlete heart-rate anchors supplied by the caller for one computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrZones {
    pub resting_hr: u32,
    pub max_hr: u32,
    /// Lactate-threshold heart rate, an alternative anchor to max HR
    pub lactate_threshold_hr: Option<u32>,
}

impl HrZones {
    /// Heart-rate reserve (max - resting), may be non-positive for bad input
    pub fn reserve(&self) -> f64 {
        f64::from(self.max_hr) - f64::from(self.resting_hr)
    }
}

/// Derived metrics for one activity
///
/// Every field is independently optional: `None` means its preconditions were
/// not met. A record is always replaced as a whole when metrics are rerun.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Speed (m/min) per heart beat
    pub efficiency_factor: Option<f64>,
    /// Efficiency factor with grade-adjusted speed
    pub normalized_efficiency_factor: Option<f64>,
    /// Efficiency loss between first and second half, in percent
    pub decoupling_pct: Option<f64>,
    /// Heart-rate rise at steady pace (bpm)
    pub cardiac_drift_bpm: Option<f64>,
    /// Pace at the low heart-rate band (seconds per distance unit)
    pub pace_at_hr_low: Option<f64>,
    /// Pace at the middle heart-rate band
    pub pace_at_hr_mid: Option<f64>,
    /// Pace at the high heart-rate band
    pub pace_at_hr_high: Option<f64>,
    /// Training impulse
    pub trimp: Option<f64>,
    /// Heart-rate stress score
    pub hrss: Option<f64>,
    /// Fraction of samples with a heart-rate reading
    pub data_quality: Option<f64>,
    /// Percent of moving samples within 10% of average pace
    pub steady_state_pct: Option<f64>,
    /// Average cadence in steps per minute (both legs)
    pub average_cadence_spm: Option<f64>,
}

/// Best contiguous segment of a stream covering a target distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEffort {
    /// Distance the search was run for
    pub target_meters: f64,
    /// Distance actually covered by the segment (>= target)
    pub distance_meters: f64,
    pub duration_seconds: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    /// Mean heart rate over the segment, ignoring dropped-sensor readings
    pub average_heart_rate: Option<f64>,
}

impl BestEffort {
    /// Segment pace in seconds per kilometer
    pub fn pace_seconds_per_km(&self) -> f64 {
        f64::from(self.duration_seconds) / (self.distance_meters / METERS_PER_KILOMETER)
    }
}

/// Race distances of the empirical pace table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardDistance {
    Metric1500,
    Mile,
    FiveK,
    TenK,
    HalfMarathon,
    Marathon,
}

impl StandardDistance {
    /// All standard distances, shortest first
    pub const ALL: [StandardDistance; 6] = [
        Self::Metric1500,
        Self::Mile,
        Self::FiveK,
        Self::TenK,
        Self::HalfMarathon,
        Self::Marathon,
    ];

    /// Distance in meters
    pub fn meters(self) -> f64 {
        match self {
            Self::Metric1500 => 1500.0,
            Self::Mile => METERS_PER_MILE,
            Self::FiveK => 5000.0,
            Self::TenK => 10_000.0,
            Self::HalfMarathon => 21_097.5,
            Self::Marathon => 42_195.0,
        }
    }

    /// Column index in the pace table (shortest distance is 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Metric1500 => "1500m",
            Self::Mile => "mile",
            Self::FiveK => "5k",
            Self::TenK => "10k",
            Self::HalfMarathon => "half_marathon",
            Self::Marathon => "marathon",
        }
    }
}

/// Category of a personal record, exactly one live record per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    /// Whole activity matching a standard race distance
    Race(StandardDistance),
    /// Fastest segment inside a longer activity
    BestEffort(StandardDistance),
    LongestRun,
    MostElevation,
    FastestPace,
}

impl RecordCategory {
    /// Stable key used by storage and display
    pub fn key(&self) -> String {
        match self {
            Self::Race(distance) => format!("race_{}", distance.label()),
            Self::BestEffort(distance) => format!("effort_{}", distance.label()),
            Self::LongestRun => "longest_run".to_string(),
            Self::MostElevation => "most_elevation".to_string(),
            Self::FastestPace => "fastest_pace".to_string(),
        }
    }

    /// Standard distance this category measures, if any
    pub fn standard_distance(&self) -> Option<StandardDistance> {
        match self {
            Self::Race(distance) | Self::BestEffort(distance) => Some(*distance),
            _ => None,
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// The live personal record of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub category: RecordCategory,
    /// Activity the record was achieved in
    pub activity_id: String,
    pub distance_meters: f64,
    pub duration_seconds: u32,
    /// Seconds per kilometer
    pub pace_seconds_per_km: f64,
    pub average_heart_rate: Option<f64>,
    /// Elevation gain of the activity (meters)
    pub elevation_gain: Option<f64>,
    pub achieved_at: DateTime<Utc>,
    /// Segment start offset for best-effort categories
    pub start_offset: Option<u32>,
    /// Segment end offset for best-effort categories
    pub end_offset: Option<u32>,
}

/// Summed training impulse of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    pub date: NaiveDate,
    pub impulse: f64,
}

/// One row of the day-by-day fitness trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessMetrics {
    pub date: NaiveDate,
    /// Load applied on this day (0 for rest days)
    pub load: f64,
    /// Long (42-day) exponential trend
    pub fitness: f64,
    /// Short (7-day) exponential trend
    pub fatigue: f64,
    /// fitness - fatigue
    pub balance: f64,
}

/// Confidence label of a race prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Label a numeric confidence score (boundaries inclusive)
    pub fn from_score(score: f64) -> Self {
        use crate::constants::prediction::{CONFIDENCE_HIGH, CONFIDENCE_MEDIUM};

        if score >= CONFIDENCE_HIGH {
            Self::High
        } else if score >= CONFIDENCE_MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Predicted result for one standard distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePrediction {
    pub target: StandardDistance,
    pub predicted_seconds: f64,
    /// Seconds per kilometer
    pub predicted_pace_seconds_per_km: f64,
    /// Fitness score (VDOT) the prediction was made from
    pub fitness_score: f64,
    pub source_category: RecordCategory,
    pub source_activity_id: String,
    pub confidence: ConfidenceLevel,
    pub confidence_score: f64,
}

/// Distance unit used for pace denominators and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    /// Length of one unit in meters
    pub fn meters(self) -> f64 {
        match self {
            Self::Kilometers => METERS_PER_KILOMETER,
            Self::Miles => METERS_PER_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometers" | "metric" => Ok(Self::Kilometers),
            "mi" | "miles" | "imperial" => Ok(Self::Miles),
            other => Err(format!("Unknown distance unit: '{other}'")),
        }
    }
}
