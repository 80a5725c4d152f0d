// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-activity metrics assembly and the efficiency trend

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use tracing::debug;

use crate::constants::prediction::{EFFICIENCY_TREND_WINDOW_DAYS, MIN_EFFICIENCY_SAMPLES};
use crate::constants::stream::{DEFAULT_PACE_HR_BANDS, DEFAULT_PACE_HR_TOLERANCE};
use crate::intelligence::stream_metrics;
use crate::intelligence::training_load;
use crate::models::{Activity, ActivityMetrics, DistanceUnit, HrZones, StreamPoint};

/// Metrics calculator for activities
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    /// Athlete heart-rate anchors
    pub zones: HrZones,
    /// Heart rates pace is reported at (low, mid, high)
    pub hr_bands: [u32; 3],
    /// Tolerance around each band in bpm
    pub hr_tolerance: u32,
    /// Pace denominator
    pub unit: DistanceUnit,
}

impl MetricsCalculator {
    /// Create a new metrics calculator with default bands and kilometer pace
    pub fn new(zones: HrZones) -> Self {
        Self {
            zones,
            hr_bands: DEFAULT_PACE_HR_BANDS,
            hr_tolerance: DEFAULT_PACE_HR_TOLERANCE,
            unit: DistanceUnit::default(),
        }
    }

    /// Set the pace-at-heart-rate bands
    pub fn with_hr_bands(mut self, hr_bands: [u32; 3], hr_tolerance: u32) -> Self {
        self.hr_bands = hr_bands;
        self.hr_tolerance = hr_tolerance;
        self
    }

    /// Set the pace unit
    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Calculate all available metrics for an activity
    ///
    /// Each field is computed independently; unmet preconditions leave it `None`.
    pub fn calculate_metrics(&self, activity: &Activity, stream: &[StreamPoint]) -> ActivityMetrics {
        let avg_pace = activity.average_pace_seconds_per_km();
        let pace_at = |target_hr: u32| {
            stream_metrics::pace_at_hr(stream, target_hr, self.hr_tolerance, self.unit.meters())
        };

        let metrics = ActivityMetrics {
            efficiency_factor: stream_metrics::efficiency_factor(stream),
            normalized_efficiency_factor: stream_metrics::normalized_efficiency_factor(stream),
            decoupling_pct: stream_metrics::aerobic_decoupling(stream),
            cardiac_drift_bpm: avg_pace.and_then(|pace| stream_metrics::cardiac_drift(stream, pace)),
            pace_at_hr_low: pace_at(self.hr_bands[0]),
            pace_at_hr_mid: pace_at(self.hr_bands[1]),
            pace_at_hr_high: pace_at(self.hr_bands[2]),
            trimp: training_load::trimp(activity, stream, &self.zones),
            hrss: training_load::hrss(activity, stream, &self.zones),
            data_quality: stream_metrics::data_quality_score(stream),
            steady_state_pct: avg_pace
                .and_then(|pace| stream_metrics::steady_state_pct(stream, pace)),
            average_cadence_spm: stream_metrics::average_cadence(stream).or_else(|| {
                activity
                    .average_cadence
                    .filter(|c| *c > 0)
                    .map(|c| f64::from(c.saturating_mul(2)))
            }),
        };

        debug!(
            activity_id = %activity.id,
            samples = stream.len(),
            has_trimp = metrics.trimp.is_some(),
            "Calculated activity metrics"
        );
        metrics
    }

    /// Calculate metrics for many activities in parallel, preserving order
    pub fn calculate_batch(&self, activities: &[(Activity, Vec<StreamPoint>)]) -> Vec<ActivityMetrics> {
        activities
            .par_iter()
            .map(|(activity, stream)| self.calculate_metrics(activity, stream))
            .collect()
    }
}

/// Percent change of mean efficiency factor, last 28 days vs the 28 before
///
/// `history` holds (activity start, efficiency factor) pairs in any order.
/// `None` unless both windows hold at least three samples.
pub fn efficiency_trend(history: &[(DateTime<Utc>, f64)], as_of: DateTime<Utc>) -> Option<f64> {
    let window = Duration::days(EFFICIENCY_TREND_WINDOW_DAYS);
    let recent_start = as_of - window;
    let prior_start = recent_start - window;

    let window_mean = |from: DateTime<Utc>, to: DateTime<Utc>| {
        let values: Vec<f64> = history
            .iter()
            .filter(|(at, ef)| *at > from && *at <= to && ef.is_finite() && *ef > 0.0)
            .map(|(_, ef)| *ef)
            .collect();
        (values.len() >= MIN_EFFICIENCY_SAMPLES)
            .then(|| values.iter().sum::<f64>() / values.len() as f64)
    };

    let Some(recent) = window_mean(recent_start, as_of) else {
        debug!("Not enough recent efficiency samples for a trend");
        return None;
    };
    let prior = window_mean(prior_start, recent_start)?;

    Some((recent / prior - 1.0) * 100.0)
}
