// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! The training analysis engine. Every function is a pure computation over
//! values already in memory, safe to call from any thread.
//!
//! This module includes:
//! - Stream metrics over a single activity
//! - Training impulse and the fitness/fatigue trend
//! - Best-effort search
//! - Personal-record detection and upsert rules
//! - VDOT pace table and race prediction
//! - Per-activity metrics assembly and the full-history analyzer

pub mod analyzer;
pub mod best_effort;
pub mod metrics;
pub mod personal_records;
pub mod race_predictor;
pub mod stream_metrics;
pub mod training_load;
pub mod vdot_table;

pub use analyzer::{ActivityReport, AnalysisError, TrainingAnalyzer, TrainingReport};
pub use best_effort::{find_best_effort, find_best_efforts};
pub use metrics::{efficiency_trend, MetricsCalculator};
pub use personal_records::{detect_candidates, ComparisonMode, RecordCatalog};
pub use race_predictor::{confidence, RacePredictor};
pub use training_load::{daily_loads, hrss, trimp, TrainingLoadModel, TrainingStatus};
pub use vdot_table::{score_from_result, time_from_score};
