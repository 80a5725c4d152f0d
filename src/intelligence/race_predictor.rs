// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Race Predictor
//!
//! Predicts times at every standard distance from one canonical personal
//! record, using the VDOT pace table. Predictions are recomputed from scratch
//! on every run.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants::prediction::{
    AGE_PENALTIES, DISTANCE_MATCH_TOLERANCE, EFFICIENCY_DECLINE_PCT, EFFICIENCY_DECLINE_PENALTY,
    RATIO_PENALTIES, RECORD_MAX_AGE_DAYS,
};
use crate::constants::units::METERS_PER_KILOMETER;
use crate::intelligence::vdot_table::{score_from_result, time_from_score};
use crate::models::{
    ConfidenceLevel, PersonalRecord, RacePrediction, RecordCategory, StandardDistance,
};

/// Fixed priority of a record as a prediction source, higher wins
///
/// Longer distances outrank shorter ones and a whole race outranks a
/// best-effort segment of the same distance. Achievements are never a source.
pub fn source_priority(category: &RecordCategory) -> Option<usize> {
    match category {
        RecordCategory::Race(distance) => Some(2 * distance.index() + 1),
        RecordCategory::BestEffort(distance) => Some(2 * distance.index()),
        RecordCategory::LongestRun | RecordCategory::MostElevation | RecordCategory::FastestPace => {
            None
        }
    }
}

/// Confidence score and label for one prediction
///
/// Starts at 1.0 and applies the distance-ratio tier, the record-age tier and
/// the efficiency-decline penalty multiplicatively.
pub fn confidence(
    target_meters: f64,
    source_meters: f64,
    age_days: i64,
    efficiency_trend_pct: Option<f64>,
) -> (f64, ConfidenceLevel) {
    let mut score = 1.0;

    let ratio = target_meters / source_meters;
    let ratio = if ratio < 1.0 { ratio.recip() } else { ratio };
    if let Some((_, penalty)) = RATIO_PENALTIES.iter().find(|(limit, _)| ratio > *limit) {
        score *= penalty;
    }

    if let Some((_, penalty)) = AGE_PENALTIES.iter().find(|(limit, _)| age_days > *limit) {
        score *= penalty;
    }

    if efficiency_trend_pct.is_some_and(|trend| trend < EFFICIENCY_DECLINE_PCT) {
        score *= EFFICIENCY_DECLINE_PENALTY;
    }

    (score, ConfidenceLevel::from_score(score))
}

/// Race predictor over a record set
#[derive(Debug, Clone, Copy)]
pub struct RacePredictor {
    max_record_age_days: i64,
}

impl Default for RacePredictor {
    fn default() -> Self {
        Self {
            max_record_age_days: RECORD_MAX_AGE_DAYS,
        }
    }
}

impl RacePredictor {
    pub fn new(max_record_age_days: i64) -> Self {
        Self {
            max_record_age_days,
        }
    }

    /// Highest-priority record achieved within the age limit
    pub fn select_source<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PersonalRecord>,
        as_of: DateTime<Utc>,
    ) -> Option<&'a PersonalRecord> {
        records
            .into_iter()
            .filter(|record| (as_of - record.achieved_at).num_days() <= self.max_record_age_days)
            .filter_map(|record| source_priority(&record.category).map(|p| (p, record)))
            .max_by_key(|(priority, _)| *priority)
            .map(|(_, record)| record)
    }

    /// Predictions for every standard distance except the source's own
    ///
    /// Empty when no recent record of a recognized category exists.
    pub fn predict<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PersonalRecord>,
        as_of: DateTime<Utc>,
        efficiency_trend_pct: Option<f64>,
    ) -> Vec<RacePrediction> {
        let Some(source) = self.select_source(records, as_of) else {
            debug!("No recent record usable for race prediction");
            return Vec::new();
        };
        let Some(fitness_score) =
            score_from_result(source.distance_meters, f64::from(source.duration_seconds))
        else {
            debug!(category = %source.category, "Source record has no usable time");
            return Vec::new();
        };

        let age_days = (as_of - source.achieved_at).num_days().max(0);
        debug!(
            category = %source.category,
            activity_id = %source.activity_id,
            fitness_score,
            age_days,
            "Selected race prediction source"
        );

        StandardDistance::ALL
            .iter()
            .filter(|target| {
                let meters = target.meters();
                (meters - source.distance_meters).abs() > meters * DISTANCE_MATCH_TOLERANCE
            })
            .filter_map(|target| {
                let meters = target.meters();
                let predicted_seconds = time_from_score(fitness_score, meters)?;
                let (confidence_score, confidence) = confidence(
                    meters,
                    source.distance_meters,
                    age_days,
                    efficiency_trend_pct,
                );
                Some(RacePrediction {
                    target: *target,
                    predicted_seconds,
                    predicted_pace_seconds_per_km: predicted_seconds
                        / (meters / METERS_PER_KILOMETER),
                    fitness_score,
                    source_category: source.category,
                    source_activity_id: source.activity_id.clone(),
                    confidence,
                    confidence_score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(category: RecordCategory, seconds: u32, days_ago: i64) -> PersonalRecord {
        let distance = category.standard_distance().map_or(12_000.0, |d| d.meters());
        PersonalRecord {
            category,
            activity_id: category.key(),
            distance_meters: distance,
            duration_seconds: seconds,
            pace_seconds_per_km: f64::from(seconds) / (distance / 1000.0),
            average_heart_rate: None,
            elevation_gain: None,
            achieved_at: as_of() - Duration::days(days_ago),
            start_offset: None,
            end_offset: None,
        }
    }

    #[test]
    fn test_source_priority_order() {
        let race_10k = source_priority(&RecordCategory::Race(StandardDistance::TenK));
        let effort_10k = source_priority(&RecordCategory::BestEffort(StandardDistance::TenK));
        let race_5k = source_priority(&RecordCategory::Race(StandardDistance::FiveK));
        assert!(race_10k > effort_10k);
        assert!(effort_10k > race_5k);
        assert_eq!(source_priority(&RecordCategory::LongestRun), None);
    }

    #[test]
    fn test_select_source_skips_old_records() {
        let records = vec![
            record(RecordCategory::Race(StandardDistance::Marathon), 12_000, 400),
            record(RecordCategory::BestEffort(StandardDistance::TenK), 2500, 20),
            record(RecordCategory::Race(StandardDistance::FiveK), 1200, 5),
            record(RecordCategory::LongestRun, 6000, 1),
        ];
        let predictor = RacePredictor::default();
        let source = predictor.select_source(&records, as_of()).unwrap();
        assert_eq!(
            source.category,
            RecordCategory::BestEffort(StandardDistance::TenK)
        );

        let only_old = vec![record(RecordCategory::Race(StandardDistance::TenK), 2500, 366)];
        assert!(predictor.select_source(&only_old, as_of()).is_none());
        assert!(predictor.predict(&only_old, as_of(), None).is_empty());
    }

    #[test]
    fn test_achievements_alone_give_no_prediction() {
        let records = vec![
            record(RecordCategory::LongestRun, 6000, 1),
            record(RecordCategory::FastestPace, 3000, 1),
        ];
        assert!(RacePredictor::default()
            .predict(&records, as_of(), None)
            .is_empty());
    }

    #[test]
    fn test_confidence_tiers() {
        let (score, label) = confidence(10_000.0, 5000.0, 0, None);
        assert!((score - 0.95).abs() < 1e-12);
        assert_eq!(label, ConfidenceLevel::High);

        // Ratio is symmetric
        assert_eq!(confidence(5000.0, 10_000.0, 0, None).0, score);

        let (score, label) = confidence(42_195.0, 5000.0, 200, None);
        assert!((score - 0.70 * 0.75).abs() < 1e-12);
        assert_eq!(label, ConfidenceLevel::Low);

        let (score, _) = confidence(5000.0, 5000.0, 0, Some(-6.0));
        assert!((score - 0.85).abs() < 1e-12);
        assert_eq!(confidence(5000.0, 5000.0, 0, Some(-5.0)).0, 1.0);
        assert_eq!(confidence(5000.0, 5000.0, 0, Some(3.0)).0, 1.0);
    }

    #[test]
    fn test_confidence_never_increases() {
        let mut previous = f64::INFINITY;
        for target in [5000.0, 8000.0, 12_000.0, 25_000.0, 42_195.0] {
            let (score, _) = confidence(target, 5000.0, 0, None);
            assert!(score <= previous);
            previous = score;
        }

        let mut previous = f64::INFINITY;
        for age in [0, 31, 91, 181, 364] {
            let (score, _) = confidence(10_000.0, 5000.0, age, None);
            assert!(score <= previous);
            previous = score;
        }

        let steady = confidence(10_000.0, 5000.0, 40, Some(0.0)).0;
        let declining = confidence(10_000.0, 5000.0, 40, Some(-12.0)).0;
        assert!(declining < steady);
    }

    #[test]
    fn test_predicts_other_distances() {
        let records = vec![record(RecordCategory::Race(StandardDistance::FiveK), 1196, 10)];
        let predictions = RacePredictor::default().predict(&records, as_of(), None);

        let targets: Vec<StandardDistance> = predictions.iter().map(|p| p.target).collect();
        assert_eq!(
            targets,
            vec![
                StandardDistance::Metric1500,
                StandardDistance::Mile,
                StandardDistance::TenK,
                StandardDistance::HalfMarathon,
                StandardDistance::Marathon,
            ]
        );

        let ten_k = &predictions[2];
        assert!((ten_k.fitness_score - 50.0).abs() < 1e-9);
        assert!((ten_k.predicted_seconds - 2480.0).abs() < 1e-9);
        assert!((ten_k.predicted_pace_seconds_per_km - 248.0).abs() < 1e-9);
        assert_eq!(ten_k.confidence, ConfidenceLevel::High);
        assert_eq!(ten_k.source_activity_id, "race_5k");

        let marathon = &predictions[4];
        assert_eq!(marathon.confidence, ConfidenceLevel::Medium);
    }
}
