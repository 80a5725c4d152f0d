// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pure functions over a single activity stream
//!
//! Every function returns `None` when its data preconditions are not met.
//! A returned `Some(0.0)` is a real, computed zero.

use tracing::debug;

use crate::constants::stream::{
    GRADE_FACTOR_COEFFICIENT, GRADE_FACTOR_MAX, GRADE_FACTOR_MIN, MAX_VALID_HR,
    MIN_DECOUPLING_SECONDS, MIN_DRIFT_SECONDS, MIN_PACE_AT_HR_SAMPLES, MIN_STEADY_STATE_SAMPLES,
    MIN_VALID_HR, MIN_VALID_VELOCITY, SECONDS_PER_MINUTE, STEADY_STATE_PACE_TOLERANCE,
};
use crate::constants::units::METERS_PER_KILOMETER;
use crate::models::StreamPoint;

/// Velocity and heart rate of a sample that passes the moving/plausible-HR filter
fn valid_sample(point: &StreamPoint) -> Option<(f64, f64)> {
    let velocity = point.velocity_mps.filter(|v| *v > MIN_VALID_VELOCITY)?;
    let heart_rate = point
        .heart_rate
        .filter(|hr| *hr > MIN_VALID_HR && *hr < MAX_VALID_HR)?;
    Some((velocity, f64::from(heart_rate)))
}

fn mean_pair(samples: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let (mut sum_a, mut sum_b, mut count) = (0.0, 0.0, 0usize);
    for (a, b) in samples {
        sum_a += a;
        sum_b += b;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum_a / count as f64, sum_b / count as f64))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    mean_pair(values.map(|v| (v, 0.0))).map(|(m, _)| m)
}

/// Seconds between the first and last sample
fn recorded_seconds(stream: &[StreamPoint]) -> u32 {
    match (stream.first(), stream.last()) {
        (Some(first), Some(last)) => last.time_offset.saturating_sub(first.time_offset),
        _ => 0,
    }
}

/// Divisor applied to velocity so climbs count as harder work
fn grade_factor(grade_percent: Option<f64>) -> f64 {
    let grade_fraction = grade_percent.unwrap_or(0.0) / 100.0;
    (1.0 + GRADE_FACTOR_COEFFICIENT * grade_fraction).clamp(GRADE_FACTOR_MIN, GRADE_FACTOR_MAX)
}

fn pace_seconds_per_km(velocity: f64) -> f64 {
    METERS_PER_KILOMETER / velocity
}

fn within_pace_band(velocity: f64, avg_pace: f64) -> bool {
    ((pace_seconds_per_km(velocity) - avg_pace) / avg_pace).abs() <= STEADY_STATE_PACE_TOLERANCE
}

/// Average speed (m/min) per average heart beat over moving samples
pub fn efficiency_factor(stream: &[StreamPoint]) -> Option<f64> {
    let (velocity, heart_rate) = mean_pair(stream.iter().filter_map(valid_sample))?;
    Some(velocity * SECONDS_PER_MINUTE / heart_rate)
}

/// Efficiency factor with grade-adjusted velocity
///
/// Velocity is divided by `1 + 3 x grade` clamped to `[0.5, 3.0]`; missing
/// grade counts as flat.
pub fn normalized_efficiency_factor(stream: &[StreamPoint]) -> Option<f64> {
    let adjusted = stream.iter().filter_map(|point| {
        valid_sample(point).map(|(v, hr)| (v / grade_factor(point.grade_percent), hr))
    });
    let (velocity, heart_rate) = mean_pair(adjusted)?;
    Some(velocity * SECONDS_PER_MINUTE / heart_rate)
}

/// Mean pace over samples within `tolerance` bpm of `target_hr`
///
/// Pace is seconds per `unit_meters` (1000 for km, 1609.344 for miles).
pub fn pace_at_hr(
    stream: &[StreamPoint],
    target_hr: u32,
    tolerance: u32,
    unit_meters: f64,
) -> Option<f64> {
    let velocities: Vec<f64> = stream
        .iter()
        .filter(|p| p.heart_rate.is_some_and(|hr| hr.abs_diff(target_hr) <= tolerance))
        .filter_map(|p| p.velocity_mps.filter(|v| *v > MIN_VALID_VELOCITY))
        .collect();

    if velocities.len() < MIN_PACE_AT_HR_SAMPLES {
        debug!(
            target_hr,
            samples = velocities.len(),
            "Not enough samples for pace at heart rate"
        );
        return None;
    }

    mean(velocities.into_iter().map(|v| unit_meters / v))
}

/// Percent efficiency lost between the first and second half of the stream
///
/// Positive when the second half is less efficient, negative for a negative
/// split.
pub fn aerobic_decoupling(stream: &[StreamPoint]) -> Option<f64> {
    if recorded_seconds(stream) < MIN_DECOUPLING_SECONDS {
        debug!("Stream too short for aerobic decoupling");
        return None;
    }

    let valid: Vec<(f64, f64)> = stream.iter().filter_map(valid_sample).collect();
    if valid.len() < 2 {
        return None;
    }

    let half = valid.len() / 2;
    let (first_v, first_hr) = mean_pair(valid[..half].iter().copied())?;
    let (second_v, second_hr) = mean_pair(valid[half..].iter().copied())?;

    let first_ratio = first_v / first_hr;
    let second_ratio = second_v / second_hr;
    Some((first_ratio / second_ratio - 1.0) * 100.0)
}

/// Heart-rate rise (bpm) between the first and last quarter of steady-state running
///
/// `avg_pace` is in seconds per kilometer. Only samples within 10% of it are
/// considered, and quarters are taken from that restricted set.
pub fn cardiac_drift(stream: &[StreamPoint], avg_pace: f64) -> Option<f64> {
    if recorded_seconds(stream) < MIN_DRIFT_SECONDS || avg_pace <= 0.0 {
        debug!("Stream too short or no average pace for cardiac drift");
        return None;
    }

    let steady: Vec<f64> = stream
        .iter()
        .filter_map(valid_sample)
        .filter(|(v, _)| within_pace_band(*v, avg_pace))
        .map(|(_, hr)| hr)
        .collect();

    if steady.len() < MIN_STEADY_STATE_SAMPLES {
        debug!(samples = steady.len(), "Not enough steady-state samples for cardiac drift");
        return None;
    }

    let quarter = steady.len() / 4;
    let first = mean(steady[..quarter].iter().copied())?;
    let last = mean(steady[steady.len() - quarter..].iter().copied())?;
    Some(last - first)
}

/// Percent of all samples whose pace is within 10% of `avg_pace` (s/km)
///
/// Stopped samples count against the percentage.
pub fn steady_state_pct(stream: &[StreamPoint], avg_pace: f64) -> Option<f64> {
    if stream.is_empty() || avg_pace <= 0.0 {
        return None;
    }

    let steady = stream
        .iter()
        .filter_map(|p| p.velocity_mps.filter(|v| *v > MIN_VALID_VELOCITY))
        .filter(|v| within_pace_band(*v, avg_pace))
        .count();
    Some(steady as f64 / stream.len() as f64 * 100.0)
}

/// Fraction of samples carrying a positive heart-rate reading
pub fn data_quality_score(stream: &[StreamPoint]) -> Option<f64> {
    if stream.is_empty() {
        return None;
    }
    let with_hr = stream
        .iter()
        .filter(|p| p.heart_rate.is_some_and(|hr| hr > 0))
        .count();
    Some(with_hr as f64 / stream.len() as f64)
}

/// Mean cadence in steps per minute over samples with a cadence reading
pub fn average_cadence(stream: &[StreamPoint]) -> Option<f64> {
    mean(
        stream
            .iter()
            .filter_map(StreamPoint::steps_per_minute)
            .filter(|spm| *spm > 0)
            .map(f64::from),
    )
}
