// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Pierre Training Engine
//!
//! Physiological training analysis for a single athlete: per-activity stream
//! metrics, the fitness/fatigue load model, best-effort search, personal
//! records and race-time prediction.
//!
//! ## Features
//!
//! - **Stream metrics**: efficiency factor, decoupling, cardiac drift, pace at heart rate
//! - **Training load**: TRIMP, HRSS and 42/7-day exponential trends over every calendar day
//! - **Best efforts**: linear two-pointer search for the fastest segment of a distance
//! - **Personal records**: one live record per category with exhaustive comparison rules
//! - **Race prediction**: VDOT pace table with a confidence heuristic
//!
//! ## Architecture
//!
//! The engine is pure and synchronous. It performs no I/O: callers load
//! activities and streams from storage, pass them in, and persist the results.
//! - **Models**: plain serializable records exchanged with storage
//! - **Intelligence**: the analysis engine
//! - **Config**: athlete configuration (TOML file plus environment overrides)
//! - **Logging**: optional `tracing` subscriber setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use pierre_training_engine::config::Config;
//! use pierre_training_engine::intelligence::TrainingAnalyzer;
//!
//! fn main() -> anyhow::Result<()> {
//!     pierre_training_engine::logging::init_from_env()?;
//!     let config = Config::load(None)?;
//!     let analyzer = TrainingAnalyzer::from_config(&config)?;
//!
//!     // Activities and streams come from the storage layer
//!     let report = analyzer.analyze(&[], Vec::new(), Utc::now());
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

/// Common data models for activities, streams and derived results
pub mod models;

/// Configuration management and persistence
pub mod config;

/// Engine thresholds and fixed coefficients
pub mod constants;

/// Training analysis engine
pub mod intelligence;

/// Structured logging setup
pub mod logging;
