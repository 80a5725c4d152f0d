// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logging configuration with structured output
//!
//! The engine itself only emits `tracing` events. Hosts that do not install
//! their own subscriber can use [`LoggingConfig::init`].

use anyhow::{anyhow, Result};
use serde_json::json;
use std::env;
use std::io;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::constants::env_config::{LOG_FORMAT, LOG_INCLUDE_LOCATION, LOG_INCLUDE_SPANS, LOG_LEVEL};
use crate::models::{RecordCategory, StandardDistance};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Subscriber settings for hosts embedding the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `pierre_training_engine=debug`
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Emit span open/close events
    pub include_spans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON lines for log collectors
    Json,
    #[default]
    Pretty,
    /// One short line per event
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: '{other}'")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
            include_location: false,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create logging configuration from an arbitrary key lookup
    ///
    /// Unknown formats fall back to pretty output. Flags are on for `1`,
    /// `true` or `yes`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key).is_some_and(|v| {
                matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes")
            })
        };

        Self {
            level: lookup(LOG_LEVEL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: lookup(LOG_FORMAT)
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            include_location: flag(LOG_INCLUDE_LOCATION),
            include_spans: flag(LOG_INCLUDE_SPANS),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global tracing subscriber, writing to stderr
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(&self) -> Result<()> {
        let env_filter =
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
        let registry = tracing_subscriber::registry().with(env_filter);

        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(true)
            .with_span_events(self.span_events());

        let installed = match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
        };
        installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

        info!(
            engine.version = env!("CARGO_PKG_VERSION"),
            log.level = %self.level,
            log.format = ?self.format,
            "Training engine logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging with default configuration
pub fn init_default() -> Result<()> {
    LoggingConfig::default().init()
}

/// Initialize logging from environment
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events of the training engine
pub struct AppLogger;

impl AppLogger {
    /// Metrics computed for a batch of activities
    pub fn log_metrics_computed(activities: usize, with_load: usize, duration_ms: u64) {
        info!(
            metrics.activities = %activities,
            metrics.with_load = %with_load,
            metrics.duration_ms = %duration_ms,
            "Activity metrics computed"
        );
    }

    /// A personal record was replaced or created
    pub fn log_record_updated(
        category: &RecordCategory,
        activity_id: &str,
        previous_activity_id: Option<&str>,
        duration_seconds: u32,
    ) {
        info!(
            record.category = %category,
            record.activity_id = %activity_id,
            record.previous_activity_id = previous_activity_id.unwrap_or("none"),
            record.duration_seconds = %duration_seconds,
            "Personal record updated"
        );
    }

    /// Fitness trend recomputed
    pub fn log_trend_computed(days: usize, fitness: f64, fatigue: f64, balance: f64) {
        info!(
            trend.days = %days,
            trend.fitness = %fitness,
            trend.fatigue = %fatigue,
            trend.balance = %balance,
            "Fitness trend computed"
        );
    }

    /// Race predictions produced from one source record
    pub fn log_predictions(source: &RecordCategory, fitness_score: f64, targets: &[StandardDistance]) {
        let labels: Vec<&str> = targets.iter().map(|t| t.label()).collect();
        info!(
            prediction.source = %source,
            prediction.fitness_score = %fitness_score,
            prediction.targets = %labels.join(","),
            "Race predictions produced"
        );
    }

    /// Log a named engine measurement
    pub fn log_performance_metric(
        metric_name: &str,
        value: f64,
        unit: &str,
        tags: Option<&serde_json::Value>,
    ) {
        info!(
            metric.name = %metric_name,
            metric.value = %value,
            metric.unit = %unit,
            metric.tags = %tags.unwrap_or(&json!({})),
            "Performance metric"
        );
    }
}
