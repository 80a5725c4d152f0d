// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Training impulse and the fitness/fatigue trend model
//!
//! TRIMP follows Banister: `minutes x HRr x e^(1.92 x HRr)` where `HRr` is the
//! fraction of heart-rate reserve used. The trend folds daily impulse into two
//! exponential moving averages (`alpha = 2 / (N + 1)`) over every calendar day
//! of the covered range, so rest days decay both averages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::load::{
    BALANCE_DETRAINING, BALANCE_OVERREACHING, BANISTER_COEFFICIENT, FATIGUE_WINDOW_DAYS,
    FITNESS_WINDOW_DAYS, HRSS_REFERENCE_TRIMP,
};
use crate::models::{Activity, DailyLoad, FitnessMetrics, HrZones, StreamPoint};

fn banister(duration_minutes: f64, hr_ratio: f64) -> f64 {
    duration_minutes * hr_ratio * (BANISTER_COEFFICIENT * hr_ratio).exp()
}

fn hr_ratio(heart_rate: f64, zones: &HrZones) -> f64 {
    ((heart_rate - f64::from(zones.resting_hr)) / zones.reserve()).clamp(0.0, 1.0)
}

/// Mean heart rate of the stream, falling back to the activity summary
fn mean_heart_rate(activity: &Activity, stream: &[StreamPoint]) -> Option<f64> {
    let (sum, count) = stream
        .iter()
        .filter_map(|p| p.heart_rate.filter(|hr| *hr > 0))
        .fold((0.0, 0usize), |(sum, count), hr| (sum + f64::from(hr), count + 1));

    if count > 0 {
        return Some(sum / count as f64);
    }
    activity
        .average_heart_rate
        .filter(|hr| *hr > 0)
        .map(f64::from)
}

/// Training impulse of one activity
///
/// `None` when the heart-rate reserve is not positive, when neither the
/// stream nor the summary carries heart rate, or when there is no moving time.
pub fn trimp(activity: &Activity, stream: &[StreamPoint], zones: &HrZones) -> Option<f64> {
    if zones.reserve() <= 0.0 {
        debug!(
            resting_hr = zones.resting_hr,
            max_hr = zones.max_hr,
            "Heart-rate reserve is not positive, skipping TRIMP"
        );
        return None;
    }

    let Some(heart_rate) = mean_heart_rate(activity, stream) else {
        debug!(activity.id = %activity.id, "No heart-rate signal, skipping TRIMP");
        return None;
    };

    if activity.moving_time_seconds == 0 {
        return None;
    }

    let minutes = f64::from(activity.moving_time_seconds) / 60.0;
    Some(banister(minutes, hr_ratio(heart_rate, zones)))
}

/// Heart-rate stress score: TRIMP as a percentage of the fixed reference effort
pub fn hrss(activity: &Activity, stream: &[StreamPoint], zones: &HrZones) -> Option<f64> {
    trimp(activity, stream, zones).map(|value| value / HRSS_REFERENCE_TRIMP * 100.0)
}

/// Sum impulse per calendar day, sorted by date
pub fn daily_loads(entries: impl IntoIterator<Item = (NaiveDate, f64)>) -> Vec<DailyLoad> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, impulse) in entries {
        *by_day.entry(date).or_insert(0.0) += impulse;
    }
    by_day
        .into_iter()
        .map(|(date, impulse)| DailyLoad { date, impulse })
        .collect()
}

/// Interpretation of the balance between fitness and fatigue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// Balance below -10: fatigue well above fitness
    Overreaching,
    /// Balance in [-10, 0)
    Productive,
    /// Balance in [0, 10]
    Fresh,
    /// Balance above 10
    Detraining,
}

impl TrainingStatus {
    pub fn from_balance(balance: f64) -> Self {
        if balance < BALANCE_OVERREACHING {
            Self::Overreaching
        } else if balance < 0.0 {
            Self::Productive
        } else if balance <= BALANCE_DETRAINING {
            Self::Fresh
        } else {
            Self::Detraining
        }
    }
}

/// Long/short exponential trend model over daily training load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingLoadModel {
    fitness_days: u32,
    fatigue_days: u32,
}

impl Default for TrainingLoadModel {
    fn default() -> Self {
        Self {
            fitness_days: FITNESS_WINDOW_DAYS,
            fatigue_days: FATIGUE_WINDOW_DAYS,
        }
    }
}

impl TrainingLoadModel {
    /// Model with custom windows; the fatigue window must be the shorter one
    pub fn new(fitness_days: u32, fatigue_days: u32) -> Option<Self> {
        if fatigue_days == 0 || fatigue_days >= fitness_days {
            return None;
        }
        Some(Self {
            fitness_days,
            fatigue_days,
        })
    }

    fn decay(window_days: u32) -> f64 {
        2.0 / (f64::from(window_days) + 1.0)
    }

    /// One row per calendar day from the earliest to the latest load date
    pub fn compute_trend(&self, loads: &[DailyLoad]) -> Vec<FitnessMetrics> {
        match loads.iter().map(|l| l.date).max() {
            Some(last) => self.compute_trend_until(loads, last),
            None => Vec::new(),
        }
    }

    /// Like [`Self::compute_trend`] but continues with rest days up to `end`
    ///
    /// Same-day duplicates are summed. Rows start at the earliest load date.
    pub fn compute_trend_until(&self, loads: &[DailyLoad], end: NaiveDate) -> Vec<FitnessMetrics> {
        let Some(start) = loads.iter().map(|l| l.date).min() else {
            return Vec::new();
        };
        let last_load = loads.iter().map(|l| l.date).max().unwrap_or(start);
        let end = end.max(last_load);

        // Day buckets indexed by offset from the start date
        let span = (end - start).num_days() as usize + 1;
        let mut buckets = vec![0.0; span];
        for load in loads {
            if !load.impulse.is_finite() {
                debug!(date = %load.date, "Skipping non-finite impulse");
                continue;
            }
            buckets[(load.date - start).num_days() as usize] += load.impulse;
        }

        let fitness_decay = Self::decay(self.fitness_days);
        let fatigue_decay = Self::decay(self.fatigue_days);

        let mut fitness = 0.0;
        let mut fatigue = 0.0;
        let trend: Vec<FitnessMetrics> = start
            .iter_days()
            .zip(buckets)
            .map(|(date, load)| {
                fitness += fitness_decay * (load - fitness);
                fatigue += fatigue_decay * (load - fatigue);
                FitnessMetrics {
                    date,
                    load,
                    fitness,
                    fatigue,
                    balance: fitness - fatigue,
                }
            })
            .collect();

        debug!(days = trend.len(), %start, %end, "Computed fitness trend");
        trend
    }
}

/// Status of the most recent trend row
pub fn current_status(trend: &[FitnessMetrics]) -> Option<TrainingStatus> {
    trend.last().map(|row| TrainingStatus::from_balance(row.balance))
}
