// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Personal Records
//!
//! Candidate detection and the per-category upsert rules. Each category holds
//! exactly one live record; a candidate either replaces it or is dropped.
//! The catalog is a single-writer structure, callers serialize access.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::records::{FASTEST_PACE_MIN_DISTANCE, RACE_MATCH_TOLERANCE};
use crate::intelligence::best_effort::find_best_efforts;
use crate::logging::AppLogger;
use crate::models::{Activity, PersonalRecord, RecordCategory, StandardDistance, StreamPoint};

/// Rule deciding whether a candidate supersedes the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Replace only when the candidate is strictly faster
    ShorterDuration,
    /// Replace only when the candidate goes strictly further (or higher)
    LongerDistance,
    /// Replace only when the candidate pace is strictly lower
    LowerPace,
}

impl ComparisonMode {
    /// Whether `candidate` beats `stored` under this mode
    pub fn wins(self, candidate: &PersonalRecord, stored: &PersonalRecord) -> bool {
        match self {
            Self::ShorterDuration => candidate.duration_seconds < stored.duration_seconds,
            Self::LongerDistance => extent(candidate) > extent(stored),
            Self::LowerPace => candidate.pace_seconds_per_km < stored.pace_seconds_per_km,
        }
    }
}

/// Quantity compared by [`ComparisonMode::LongerDistance`]
fn extent(record: &PersonalRecord) -> f64 {
    match record.category {
        RecordCategory::MostElevation => record.elevation_gain.unwrap_or(0.0),
        _ => record.distance_meters,
    }
}

impl RecordCategory {
    /// Comparison rule of this category
    pub fn comparison_mode(&self) -> ComparisonMode {
        match self {
            Self::Race(_) | Self::BestEffort(_) => ComparisonMode::ShorterDuration,
            Self::LongestRun | Self::MostElevation => ComparisonMode::LongerDistance,
            Self::FastestPace => ComparisonMode::LowerPace,
        }
    }
}

/// Current record set, one entry per category
#[derive(Debug, Clone, Default)]
pub struct RecordCatalog {
    records: HashMap<RecordCategory, PersonalRecord>,
}

impl RecordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from stored records, keeping the winner per category
    ///
    /// Loading is not an update, so no record events are emitted.
    pub fn from_records(records: impl IntoIterator<Item = PersonalRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            let category = record.category;
            match catalog.records.get(&category) {
                Some(stored) if !category.comparison_mode().wins(&record, stored) => {}
                _ => {
                    catalog.records.insert(category, record);
                }
            }
        }
        debug!(records = catalog.len(), "Loaded stored personal records");
        catalog
    }

    /// Insert or replace the record of the candidate's category
    ///
    /// Returns `true` when the catalog changed. Resubmitting an identical or
    /// worse candidate is a no-op.
    pub fn upsert(&mut self, candidate: PersonalRecord) -> bool {
        let category = candidate.category;
        match self.records.get(&category) {
            Some(stored) if !category.comparison_mode().wins(&candidate, stored) => {
                debug!(
                    category = %category,
                    activity_id = %candidate.activity_id,
                    "Candidate does not beat stored record"
                );
                false
            }
            previous => {
                AppLogger::log_record_updated(
                    &category,
                    &candidate.activity_id,
                    previous.map(|p| p.activity_id.as_str()),
                    candidate.duration_seconds,
                );
                self.records.insert(category, candidate);
                true
            }
        }
    }

    /// Detect all candidates of an activity and upsert them
    ///
    /// Returns the categories that changed.
    pub fn apply_activity(
        &mut self,
        activity: &Activity,
        stream: &[StreamPoint],
    ) -> Vec<RecordCategory> {
        detect_candidates(activity, stream)
            .into_iter()
            .filter_map(|candidate| {
                let category = candidate.category;
                self.upsert(candidate).then_some(category)
            })
            .collect()
    }

    pub fn get(&self, category: &RecordCategory) -> Option<&PersonalRecord> {
        self.records.get(category)
    }

    pub fn records(&self) -> impl Iterator<Item = &PersonalRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by category key, for stable output
    pub fn into_sorted_vec(self) -> Vec<PersonalRecord> {
        let mut records: Vec<PersonalRecord> = self.records.into_values().collect();
        records.sort_by_key(|r| r.category.key());
        records
    }
}

/// Standard distance an activity's total distance matches within 3%
pub fn matching_race_distance(distance_meters: f64) -> Option<StandardDistance> {
    StandardDistance::ALL.into_iter().find(|standard| {
        let meters = standard.meters();
        (distance_meters - meters).abs() <= meters * RACE_MATCH_TOLERANCE
    })
}

/// Every record candidate a running activity produces
///
/// Non-running activities and activities without moving time yield nothing.
pub fn detect_candidates(activity: &Activity, stream: &[StreamPoint]) -> Vec<PersonalRecord> {
    if !activity.sport_type.is_run() {
        return Vec::new();
    }
    let Some(pace) = activity.average_pace_seconds_per_km() else {
        debug!(activity_id = %activity.id, "Activity has no pace, skipping record detection");
        return Vec::new();
    };

    let whole = |category: RecordCategory| PersonalRecord {
        category,
        activity_id: activity.id.clone(),
        distance_meters: activity.distance_meters,
        duration_seconds: activity.moving_time_seconds,
        pace_seconds_per_km: pace,
        average_heart_rate: activity.average_heart_rate.map(f64::from),
        elevation_gain: activity.elevation_gain,
        achieved_at: activity.start_date,
        start_offset: None,
        end_offset: None,
    };

    let mut candidates = Vec::new();

    if let Some(standard) = matching_race_distance(activity.distance_meters) {
        candidates.push(whole(RecordCategory::Race(standard)));
    }

    candidates.extend(
        find_best_efforts(stream)
            .into_iter()
            .map(|(standard, effort)| PersonalRecord {
                category: RecordCategory::BestEffort(standard),
                activity_id: activity.id.clone(),
                distance_meters: effort.distance_meters,
                duration_seconds: effort.duration_seconds,
                pace_seconds_per_km: effort.pace_seconds_per_km(),
                average_heart_rate: effort.average_heart_rate,
                elevation_gain: None,
                achieved_at: activity.start_date,
                start_offset: Some(effort.start_offset),
                end_offset: Some(effort.end_offset),
            }),
    );

    candidates.push(whole(RecordCategory::LongestRun));
    if activity.elevation_gain.is_some_and(|gain| gain > 0.0) {
        candidates.push(whole(RecordCategory::MostElevation));
    }
    if activity.distance_meters >= FASTEST_PACE_MIN_DISTANCE {
        candidates.push(whole(RecordCategory::FastestPace));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SportType;
    use chrono::{TimeZone, Utc};

    fn run(id: &str, distance: f64, seconds: u32) -> Activity {
        Activity {
            id: id.to_string(),
            name: format!("Run {id}"),
            sport_type: SportType::Run,
            start_date: Utc.with_ymd_and_hms(2025, 5, 10, 8, 0, 0).unwrap(),
            distance_meters: distance,
            moving_time_seconds: seconds,
            elevation_gain: Some(40.0),
            average_heart_rate: Some(155),
            average_cadence: None,
        }
    }

    fn record(category: RecordCategory, id: &str, distance: f64, seconds: u32) -> PersonalRecord {
        PersonalRecord {
            category,
            activity_id: id.to_string(),
            distance_meters: distance,
            duration_seconds: seconds,
            pace_seconds_per_km: f64::from(seconds) / (distance / 1000.0),
            average_heart_rate: None,
            elevation_gain: None,
            achieved_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            start_offset: None,
            end_offset: None,
        }
    }

    #[test]
    fn test_shorter_duration_upsert_is_idempotent() {
        let category = RecordCategory::Race(StandardDistance::FiveK);
        let mut catalog = RecordCatalog::new();

        assert!(catalog.upsert(record(category, "a", 5000.0, 1300)));
        assert!(!catalog.upsert(record(category, "a", 5000.0, 1300)));
        assert!(!catalog.upsert(record(category, "b", 5000.0, 1350)));
        assert_eq!(catalog.get(&category).unwrap().activity_id, "a");

        assert!(catalog.upsert(record(category, "c", 5000.0, 1250)));
        assert_eq!(catalog.get(&category).unwrap().activity_id, "c");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_from_records_keeps_winner_in_any_order() {
        let category = RecordCategory::Race(StandardDistance::TenK);
        let fast = record(category, "fast", 10_000.0, 2600);
        let slow = record(category, "slow", 10_000.0, 2800);
        let longest = record(RecordCategory::LongestRun, "long", 30_000.0, 10_800);

        for stored in [
            vec![fast.clone(), slow.clone(), longest.clone()],
            vec![slow.clone(), longest.clone(), fast.clone()],
        ] {
            let mut catalog = RecordCatalog::from_records(stored);
            assert_eq!(catalog.len(), 2);
            assert_eq!(catalog.get(&category).unwrap().activity_id, "fast");
            // Loaded records count as stored, so resubmitting them is a no-op
            assert!(!catalog.upsert(fast.clone()));
            assert!(!catalog.upsert(longest.clone()));
        }
    }

    #[test]
    fn test_longer_distance_wins() {
        let mut catalog = RecordCatalog::new();
        assert!(catalog.upsert(record(RecordCategory::LongestRun, "a", 21_000.0, 7000)));
        assert!(!catalog.upsert(record(RecordCategory::LongestRun, "b", 21_000.0, 6000)));
        assert!(catalog.upsert(record(RecordCategory::LongestRun, "c", 25_000.0, 9000)));
    }

    #[test]
    fn test_most_elevation_compares_gain() {
        let mut low = record(RecordCategory::MostElevation, "low", 30_000.0, 10_000);
        low.elevation_gain = Some(200.0);
        let mut high = record(RecordCategory::MostElevation, "high", 8_000.0, 3_000);
        high.elevation_gain = Some(650.0);

        let mut catalog = RecordCatalog::new();
        assert!(catalog.upsert(low.clone()));
        assert!(catalog.upsert(high));
        assert!(!catalog.upsert(low));
        assert_eq!(
            catalog.get(&RecordCategory::MostElevation).unwrap().activity_id,
            "high"
        );
    }

    #[test]
    fn test_lower_pace_wins() {
        let mut catalog = RecordCatalog::new();
        assert!(catalog.upsert(record(RecordCategory::FastestPace, "a", 5000.0, 1500)));
        // Longer but slower
        assert!(!catalog.upsert(record(RecordCategory::FastestPace, "b", 10_000.0, 3100)));
        assert!(catalog.upsert(record(RecordCategory::FastestPace, "c", 4000.0, 1160)));
    }

    #[test]
    fn test_race_distance_matching() {
        assert_eq!(matching_race_distance(5100.0), Some(StandardDistance::FiveK));
        assert_eq!(matching_race_distance(4851.0), Some(StandardDistance::FiveK));
        assert_eq!(matching_race_distance(5200.0), None);
        assert_eq!(matching_race_distance(42_500.0), Some(StandardDistance::Marathon));
        assert_eq!(matching_race_distance(1600.0), Some(StandardDistance::Mile));
    }

    #[test]
    fn test_candidates_for_run_without_stream() {
        let candidates = detect_candidates(&run("r1", 10_050.0, 2700), &[]);
        let categories: Vec<RecordCategory> = candidates.iter().map(|c| c.category).collect();

        assert_eq!(
            categories,
            vec![
                RecordCategory::Race(StandardDistance::TenK),
                RecordCategory::LongestRun,
                RecordCategory::MostElevation,
                RecordCategory::FastestPace,
            ]
        );
    }

    #[test]
    fn test_candidates_include_stream_efforts() {
        let stream: Vec<StreamPoint> = (0..700u32)
            .map(|t| StreamPoint {
                distance_meters: Some(f64::from(t) * 4.0),
                heart_rate: Some(160),
                ..StreamPoint::at(t)
            })
            .collect();
        let candidates = detect_candidates(&run("r2", 2796.0, 699), &stream);

        let effort = candidates
            .iter()
            .find(|c| c.category == RecordCategory::BestEffort(StandardDistance::Metric1500))
            .unwrap();
        assert_eq!(effort.duration_seconds, 375);
        assert_eq!(effort.start_offset, Some(0));
        assert_eq!(effort.end_offset, Some(375));
        // Under 3 km: no fastest-pace candidate
        assert!(!candidates
            .iter()
            .any(|c| c.category == RecordCategory::FastestPace));
    }

    #[test]
    fn test_non_runs_produce_nothing() {
        let mut ride = run("ride", 40_000.0, 4000);
        ride.sport_type = SportType::Ride;
        assert!(detect_candidates(&ride, &[]).is_empty());

        let stationary = run("zero", 0.0, 0);
        assert!(detect_candidates(&stationary, &[]).is_empty());
    }

    #[test]
    fn test_apply_activity_reports_changes() {
        let mut catalog = RecordCatalog::new();
        let first = catalog.apply_activity(&run("a", 5000.0, 1400), &[]);
        assert!(first.contains(&RecordCategory::Race(StandardDistance::FiveK)));

        let second = catalog.apply_activity(&run("b", 5000.0, 1450), &[]);
        assert!(second.is_empty());

        let third = catalog.apply_activity(&run("c", 5000.0, 1350), &[]);
        assert!(third.contains(&RecordCategory::FastestPace));
        assert!(!third.contains(&RecordCategory::LongestRun));
    }
}
