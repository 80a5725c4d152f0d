// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fastest contiguous segment of a stream covering a target distance
//!
//! Uses a two-pointer sweep over the samples that carry a distance reading.
//! Cumulative distance never decreases, so the first right index reaching the
//! target for a start index can only move forward as the start advances,
//! which keeps the search linear in the number of samples.

use tracing::debug;

use crate::constants::effort::{MIN_DISTANCE_POINTS, MIN_SEGMENT_HR};
use crate::models::{BestEffort, StandardDistance, StreamPoint};

/// A sample with a distance reading and its index in the original stream
#[derive(Debug, Clone, Copy)]
struct DistanceSample {
    index: usize,
    time_offset: u32,
    distance: f64,
}

/// Find the minimum-duration segment covering at least `target_meters`
///
/// Returns `None` when fewer than 10 samples carry distance, when the stream
/// covers less than the target, or when no segment has a positive duration.
pub fn find_best_effort(stream: &[StreamPoint], target_meters: f64) -> Option<BestEffort> {
    if target_meters <= 0.0 {
        return None;
    }

    let samples: Vec<DistanceSample> = stream
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            point.distance_meters.map(|distance| DistanceSample {
                index,
                time_offset: point.time_offset,
                distance,
            })
        })
        .collect();

    if samples.len() < MIN_DISTANCE_POINTS {
        debug!(samples = samples.len(), "Not enough distance samples for best effort");
        return None;
    }

    let covered = samples[samples.len() - 1].distance - samples[0].distance;
    if covered < target_meters {
        debug!(covered, target_meters, "Stream shorter than best-effort target");
        return None;
    }

    let mut best: Option<(DistanceSample, DistanceSample)> = None;
    let mut best_duration = u32::MAX;
    let mut right = 0;

    for (left, start) in samples.iter().enumerate() {
        right = right.max(left);
        while right < samples.len() && samples[right].distance - start.distance < target_meters {
            right += 1;
        }
        if right == samples.len() {
            break;
        }

        let end = samples[right];
        let duration = end.time_offset.saturating_sub(start.time_offset);
        if duration > 0 && duration < best_duration {
            best_duration = duration;
            best = Some((*start, end));
        }
    }

    let (start, end) = best?;
    Some(BestEffort {
        target_meters,
        distance_meters: end.distance - start.distance,
        duration_seconds: best_duration,
        start_offset: start.time_offset,
        end_offset: end.time_offset,
        average_heart_rate: segment_heart_rate(&stream[start.index..=end.index]),
    })
}

/// Mean heart rate ignoring dropped-sensor readings
fn segment_heart_rate(segment: &[StreamPoint]) -> Option<f64> {
    let (sum, count) = segment
        .iter()
        .filter_map(|p| p.heart_rate.filter(|hr| *hr > MIN_SEGMENT_HR))
        .fold((0.0, 0usize), |(sum, count), hr| (sum + f64::from(hr), count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Best efforts for every standard distance the stream covers
pub fn find_best_efforts(stream: &[StreamPoint]) -> Vec<(StandardDistance, BestEffort)> {
    StandardDistance::ALL
        .iter()
        .filter_map(|distance| {
            find_best_effort(stream, distance.meters()).map(|effort| (*distance, effort))
        })
        .collect()
}
