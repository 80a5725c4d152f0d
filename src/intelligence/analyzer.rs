// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Training analyzer running the whole engine over an in-memory dataset

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::metrics::{efficiency_trend, MetricsCalculator};
use super::personal_records::RecordCatalog;
use super::race_predictor::RacePredictor;
use super::training_load::{current_status, daily_loads, TrainingLoadModel, TrainingStatus};
use crate::config::AthleteConfig;
use crate::logging::AppLogger;
use crate::models::{
    Activity, ActivityMetrics, FitnessMetrics, PersonalRecord, RacePrediction, RecordCategory,
    StreamPoint,
};

/// Metrics of one analyzed activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub activity_id: String,
    pub start_date: DateTime<Utc>,
    pub metrics: ActivityMetrics,
}

/// Everything the engine derives from an athlete's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub generated_at: DateTime<Utc>,
    /// Per-activity metrics, in input order
    pub activities: Vec<ActivityReport>,
    /// One row per calendar day up to `generated_at`
    pub trend: Vec<FitnessMetrics>,
    pub status: Option<TrainingStatus>,
    /// Recent efficiency change in percent
    pub efficiency_trend_pct: Option<f64>,
    /// Current record set, sorted by category key
    pub records: Vec<PersonalRecord>,
    /// Categories whose record changed during this run
    pub updated_records: Vec<RecordCategory>,
    pub predictions: Vec<RacePrediction>,
}

/// Main analyzer composing metrics, load, records and prediction
#[derive(Debug, Clone, Copy)]
pub struct TrainingAnalyzer {
    calculator: MetricsCalculator,
    load_model: TrainingLoadModel,
    predictor: RacePredictor,
}

impl TrainingAnalyzer {
    pub fn new(
        calculator: MetricsCalculator,
        load_model: TrainingLoadModel,
        predictor: RacePredictor,
    ) -> Self {
        Self {
            calculator,
            load_model,
            predictor,
        }
    }

    /// Build an analyzer from a validated athlete configuration
    pub fn from_config(config: &AthleteConfig) -> Result<Self, AnalysisError> {
        let analysis = &config.analysis;
        let load_model =
            TrainingLoadModel::new(analysis.fitness_window_days, analysis.fatigue_window_days)
                .ok_or(AnalysisError::InvalidLoadWindows {
                    fitness: analysis.fitness_window_days,
                    fatigue: analysis.fatigue_window_days,
                })?;

        let calculator = MetricsCalculator::new(config.hr_zones())
            .with_hr_bands(analysis.pace_hr_bands, analysis.pace_hr_tolerance)
            .with_unit(config.units);

        Ok(Self::new(
            calculator,
            load_model,
            RacePredictor::new(analysis.record_max_age_days),
        ))
    }

    pub fn calculator(&self) -> &MetricsCalculator {
        &self.calculator
    }

    /// Analyze a full history
    ///
    /// `stored_records` is the record set before this run. Activities feed
    /// the record catalog in start order so that on equal performances the
    /// earliest one keeps the record.
    pub fn analyze(
        &self,
        activities: &[(Activity, Vec<StreamPoint>)],
        stored_records: impl IntoIterator<Item = PersonalRecord>,
        as_of: DateTime<Utc>,
    ) -> TrainingReport {
        let started = Instant::now();
        let metrics = self.calculator.calculate_batch(activities);
        let with_load = metrics.iter().filter(|m| m.trimp.is_some()).count();
        AppLogger::log_metrics_computed(
            activities.len(),
            with_load,
            started.elapsed().as_millis() as u64,
        );

        let loads = daily_loads(
            activities
                .iter()
                .zip(&metrics)
                .filter_map(|((activity, _), m)| m.trimp.map(|trimp| (activity.date(), trimp))),
        );
        let trend = self
            .load_model
            .compute_trend_until(&loads, as_of.date_naive());
        if let Some(today) = trend.last() {
            AppLogger::log_trend_computed(trend.len(), today.fitness, today.fatigue, today.balance);
        }

        let efficiency_history: Vec<(DateTime<Utc>, f64)> = activities
            .iter()
            .zip(&metrics)
            .filter_map(|((activity, _), m)| m.efficiency_factor.map(|ef| (activity.start_date, ef)))
            .collect();
        let efficiency_trend_pct = efficiency_trend(&efficiency_history, as_of);

        let mut catalog = RecordCatalog::from_records(stored_records);
        let mut chronological: Vec<&(Activity, Vec<StreamPoint>)> = activities.iter().collect();
        chronological.sort_by_key(|(activity, _)| activity.start_date);

        let mut updated_records = Vec::new();
        for (activity, stream) in chronological {
            for category in catalog.apply_activity(activity, stream) {
                if !updated_records.contains(&category) {
                    updated_records.push(category);
                }
            }
        }

        let predictions = self
            .predictor
            .predict(catalog.records(), as_of, efficiency_trend_pct);
        if let Some(first) = predictions.first() {
            let targets: Vec<_> = predictions.iter().map(|p| p.target).collect();
            AppLogger::log_predictions(&first.source_category, first.fitness_score, &targets);
        }

        AppLogger::log_performance_metric(
            "analysis_duration",
            started.elapsed().as_secs_f64() * 1000.0,
            "ms",
            Some(&serde_json::json!({
                "activities": activities.len(),
                "records": catalog.len(),
                "predictions": predictions.len(),
            })),
        );

        TrainingReport {
            generated_at: as_of,
            activities: activities
                .iter()
                .zip(metrics)
                .map(|((activity, _), metrics)| ActivityReport {
                    activity_id: activity.id.clone(),
                    start_date: activity.start_date,
                    metrics,
                })
                .collect(),
            status: current_status(&trend),
            trend,
            efficiency_trend_pct,
            records: catalog.into_sorted_vec(),
            updated_records,
            predictions,
        }
    }
}

/// Errors that can occur while setting up an analysis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid load windows: fitness {fitness} days, fatigue {fatigue} days")]
    InvalidLoadWindows { fitness: u32, fatigue: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HrZones, SportType, StandardDistance};
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 18, 0, 0).unwrap()
    }

    fn create_test_run(id: &str, days_ago: i64, distance: f64, seconds: u32) -> Activity {
        Activity {
            id: id.to_string(),
            name: format!("Run {id}"),
            sport_type: SportType::Run,
            start_date: as_of() - Duration::days(days_ago),
            distance_meters: distance,
            moving_time_seconds: seconds,
            elevation_gain: Some(30.0),
            average_heart_rate: Some(150),
            average_cadence: None,
        }
    }

    #[test]
    fn test_from_config_rejects_bad_windows() {
        let mut config = AthleteConfig::default();
        config.analysis.fatigue_window_days = 50;
        assert_eq!(
            TrainingAnalyzer::from_config(&config).unwrap_err(),
            AnalysisError::InvalidLoadWindows {
                fitness: 42,
                fatigue: 50
            }
        );
    }

    #[test]
    fn test_from_config_carries_settings() {
        let mut config = AthleteConfig::default();
        config.heart_rate.lthr = Some(172);
        config.analysis.pace_hr_bands = [130, 150, 170];

        let analyzer = TrainingAnalyzer::from_config(&config).unwrap();
        assert_eq!(
            analyzer.calculator().zones,
            HrZones {
                resting_hr: 60,
                max_hr: 190,
                lactate_threshold_hr: Some(172),
            }
        );
        assert_eq!(analyzer.calculator().hr_bands, [130, 150, 170]);
    }

    #[test]
    fn test_analyze_summary_only_history() {
        let activities = vec![
            (create_test_run("a", 20, 5000.0, 1500), Vec::new()),
            (create_test_run("b", 10, 10_000.0, 3100), Vec::new()),
            (create_test_run("c", 3, 5000.0, 1450), Vec::new()),
        ];
        let analyzer = TrainingAnalyzer::from_config(&AthleteConfig::default()).unwrap();
        let report = analyzer.analyze(&activities, Vec::new(), as_of());

        assert_eq!(report.activities.len(), 3);
        assert_eq!(report.activities[1].activity_id, "b");
        // Trend runs from the first activity through the as-of day
        assert_eq!(report.trend.len(), 21);
        assert_eq!(report.trend.last().unwrap().load, 0.0);
        assert!(report.status.is_some());
        assert_eq!(report.efficiency_trend_pct, None);

        let race_5k = report
            .records
            .iter()
            .find(|r| r.category == RecordCategory::Race(StandardDistance::FiveK))
            .unwrap();
        assert_eq!(race_5k.activity_id, "c");

        // 10K race record outranks the 5K as prediction source
        assert!(!report.predictions.is_empty());
        assert!(report
            .predictions
            .iter()
            .all(|p| p.source_category == RecordCategory::Race(StandardDistance::TenK)));
        assert!(report
            .predictions
            .iter()
            .all(|p| p.target != StandardDistance::TenK));
    }

    #[test]
    fn test_stored_records_are_respected() {
        let analyzer = TrainingAnalyzer::from_config(&AthleteConfig::default()).unwrap();
        let first = analyzer.analyze(
            &[(create_test_run("fast", 30, 5000.0, 1200), Vec::new())],
            Vec::new(),
            as_of(),
        );

        let second = analyzer.analyze(
            &[(create_test_run("slow", 2, 5000.0, 1400), Vec::new())],
            first.records.clone(),
            as_of(),
        );

        assert!(!second
            .updated_records
            .contains(&RecordCategory::Race(StandardDistance::FiveK)));
        let race_5k = second
            .records
            .iter()
            .find(|r| r.category == RecordCategory::Race(StandardDistance::FiveK))
            .unwrap();
        assert_eq!(race_5k.activity_id, "fast");
    }

    #[test]
    fn test_empty_history() {
        let analyzer = TrainingAnalyzer::from_config(&AthleteConfig::default()).unwrap();
        let report = analyzer.analyze(&[], Vec::new(), as_of());

        assert!(report.activities.is_empty());
        assert!(report.trend.is_empty());
        assert_eq!(report.status, None);
        assert!(report.records.is_empty());
        assert!(report.predictions.is_empty());
    }
}
