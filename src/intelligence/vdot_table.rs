// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # VDOT Pace Table
//!
//! Equivalent race times by fitness score, derived from the Daniels/Gilbert
//! oxygen-cost and time-to-exhaustion curves. Rows are ordered by increasing
//! score, so times in every column strictly decrease down the table.
//!
//! Distances that do not match a column within 5% get a synthesized column by
//! log-linear interpolation between the bracketing standard distances, which
//! follows the power-law relation between race distance and time.

use crate::constants::prediction::DISTANCE_MATCH_TOLERANCE;
use crate::models::StandardDistance;

/// One row of the pace table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VdotRow {
    pub score: f64,
    /// Race time in seconds, indexed by [`StandardDistance::index`]
    pub seconds: [f64; 6],
}

pub const MIN_SCORE: f64 = 30.0;
pub const MAX_SCORE: f64 = 85.0;

/// Equivalent times for scores 30 to 85
pub static VDOT_TABLE: [VdotRow; 56] = [
    VdotRow { score: 30.0, seconds: [510.0, 550.0, 1841.0, 3829.0, 8477.0, 17389.0] },
    VdotRow { score: 31.0, seconds: [495.0, 535.0, 1791.0, 3725.0, 8250.0, 16941.0] },
    VdotRow { score: 32.0, seconds: [482.0, 520.0, 1745.0, 3627.0, 8035.0, 16517.0] },
    VdotRow { score: 33.0, seconds: [469.0, 506.0, 1700.0, 3534.0, 7831.0, 16114.0] },
    VdotRow { score: 34.0, seconds: [456.0, 493.0, 1658.0, 3445.0, 7637.0, 15731.0] },
    VdotRow { score: 35.0, seconds: [445.0, 481.0, 1619.0, 3362.0, 7453.0, 15366.0] },
    VdotRow { score: 36.0, seconds: [434.0, 469.0, 1581.0, 3282.0, 7278.0, 15019.0] },
    VdotRow { score: 37.0, seconds: [423.0, 458.0, 1545.0, 3207.0, 7111.0, 14687.0] },
    VdotRow { score: 38.0, seconds: [414.0, 447.0, 1510.0, 3135.0, 6951.0, 14370.0] },
    VdotRow { score: 39.0, seconds: [404.0, 437.0, 1478.0, 3066.0, 6799.0, 14067.0] },
    VdotRow { score: 40.0, seconds: [395.0, 427.0, 1446.0, 3001.0, 6654.0, 13777.0] },
    VdotRow { score: 41.0, seconds: [386.0, 418.0, 1416.0, 2938.0, 6515.0, 13500.0] },
    VdotRow { score: 42.0, seconds: [378.0, 409.0, 1388.0, 2878.0, 6382.0, 13233.0] },
    VdotRow { score: 43.0, seconds: [370.0, 400.0, 1360.0, 2821.0, 6254.0, 12977.0] },
    VdotRow { score: 44.0, seconds: [363.0, 392.0, 1334.0, 2766.0, 6132.0, 12732.0] },
    VdotRow { score: 45.0, seconds: [356.0, 384.0, 1309.0, 2713.0, 6014.0, 12496.0] },
    VdotRow { score: 46.0, seconds: [349.0, 377.0, 1284.0, 2663.0, 5901.0, 12269.0] },
    VdotRow { score: 47.0, seconds: [342.0, 370.0, 1261.0, 2614.0, 5793.0, 12050.0] },
    VdotRow { score: 48.0, seconds: [336.0, 363.0, 1238.0, 2568.0, 5688.0, 11839.0] },
    VdotRow { score: 49.0, seconds: [330.0, 356.0, 1217.0, 2523.0, 5588.0, 11636.0] },
    VdotRow { score: 50.0, seconds: [324.0, 350.0, 1196.0, 2480.0, 5491.0, 11440.0] },
    VdotRow { score: 51.0, seconds: [318.0, 344.0, 1176.0, 2438.0, 5398.0, 11250.0] },
    VdotRow { score: 52.0, seconds: [313.0, 338.0, 1157.0, 2398.0, 5308.0, 11068.0] },
    VdotRow { score: 53.0, seconds: [307.0, 332.0, 1138.0, 2359.0, 5221.0, 10891.0] },
    VdotRow { score: 54.0, seconds: [302.0, 327.0, 1120.0, 2322.0, 5137.0, 10720.0] },
    VdotRow { score: 55.0, seconds: [297.0, 321.0, 1102.0, 2286.0, 5056.0, 10555.0] },
    VdotRow { score: 56.0, seconds: [293.0, 316.0, 1085.0, 2251.0, 4978.0, 10395.0] },
    VdotRow { score: 57.0, seconds: [288.0, 311.0, 1069.0, 2217.0, 4902.0, 10240.0] },
    VdotRow { score: 58.0, seconds: [284.0, 306.0, 1053.0, 2184.0, 4828.0, 10089.0] },
    VdotRow { score: 59.0, seconds: [279.0, 302.0, 1038.0, 2153.0, 4757.0, 9944.0] },
    VdotRow { score: 60.0, seconds: [275.0, 297.0, 1023.0, 2122.0, 4689.0, 9802.0] },
    VdotRow { score: 61.0, seconds: [271.0, 293.0, 1008.0, 2092.0, 4622.0, 9665.0] },
    VdotRow { score: 62.0, seconds: [267.0, 289.0, 994.0, 2063.0, 4557.0, 9532.0] },
    VdotRow { score: 63.0, seconds: [264.0, 285.0, 981.0, 2035.0, 4494.0, 9403.0] },
    VdotRow { score: 64.0, seconds: [260.0, 281.0, 967.0, 2008.0, 4434.0, 9277.0] },
    VdotRow { score: 65.0, seconds: [256.0, 277.0, 955.0, 1982.0, 4374.0, 9155.0] },
    VdotRow { score: 66.0, seconds: [253.0, 273.0, 942.0, 1956.0, 4317.0, 9037.0] },
    VdotRow { score: 67.0, seconds: [250.0, 270.0, 930.0, 1932.0, 4261.0, 8921.0] },
    VdotRow { score: 68.0, seconds: [246.0, 266.0, 918.0, 1907.0, 4207.0, 8809.0] },
    VdotRow { score: 69.0, seconds: [243.0, 263.0, 907.0, 1884.0, 4154.0, 8699.0] },
    VdotRow { score: 70.0, seconds: [240.0, 259.0, 896.0, 1861.0, 4103.0, 8593.0] },
    VdotRow { score: 71.0, seconds: [237.0, 256.0, 885.0, 1839.0, 4053.0, 8489.0] },
    VdotRow { score: 72.0, seconds: [234.0, 253.0, 874.0, 1817.0, 4004.0, 8388.0] },
    VdotRow { score: 73.0, seconds: [232.0, 250.0, 864.0, 1796.0, 3957.0, 8289.0] },
    VdotRow { score: 74.0, seconds: [229.0, 247.0, 854.0, 1775.0, 3910.0, 8193.0] },
    VdotRow { score: 75.0, seconds: [226.0, 244.0, 844.0, 1755.0, 3866.0, 8099.0] },
    VdotRow { score: 76.0, seconds: [224.0, 241.0, 834.0, 1736.0, 3822.0, 8008.0] },
    VdotRow { score: 77.0, seconds: [221.0, 239.0, 825.0, 1717.0, 3779.0, 7919.0] },
    VdotRow { score: 78.0, seconds: [219.0, 236.0, 816.0, 1698.0, 3737.0, 7831.0] },
    VdotRow { score: 79.0, seconds: [216.0, 233.0, 807.0, 1680.0, 3696.0, 7746.0] },
    VdotRow { score: 80.0, seconds: [214.0, 231.0, 798.0, 1662.0, 3657.0, 7663.0] },
    VdotRow { score: 81.0, seconds: [212.0, 228.0, 789.0, 1645.0, 3618.0, 7582.0] },
    VdotRow { score: 82.0, seconds: [209.0, 226.0, 781.0, 1628.0, 3580.0, 7503.0] },
    VdotRow { score: 83.0, seconds: [207.0, 224.0, 773.0, 1611.0, 3543.0, 7425.0] },
    VdotRow { score: 84.0, seconds: [205.0, 221.0, 765.0, 1595.0, 3507.0, 7349.0] },
    VdotRow { score: 85.0, seconds: [203.0, 219.0, 757.0, 1579.0, 3471.0, 7275.0] },
];

/// Column index of a standard distance within 5% of `distance_meters`
fn matching_column(distance_meters: f64) -> Option<usize> {
    StandardDistance::ALL
        .iter()
        .find(|standard| {
            let meters = standard.meters();
            (distance_meters - meters).abs() <= meters * DISTANCE_MATCH_TOLERANCE
        })
        .map(|standard| standard.index())
}

/// Expected time of `row` at an arbitrary distance
fn row_time(row: &VdotRow, distance_meters: f64, column: Option<usize>) -> f64 {
    if let Some(column) = column {
        return row.seconds[column];
    }

    // Bracketing pair, or the nearest end pair for extrapolation
    let upper = StandardDistance::ALL
        .iter()
        .position(|standard| standard.meters() >= distance_meters)
        .unwrap_or(StandardDistance::ALL.len() - 1)
        .max(1);
    let lower = upper - 1;

    let (d0, d1) = (
        StandardDistance::ALL[lower].meters().ln(),
        StandardDistance::ALL[upper].meters().ln(),
    );
    let (t0, t1) = (row.seconds[lower].ln(), row.seconds[upper].ln());
    let slope = (t1 - t0) / (d1 - d0);

    (t0 + slope * (distance_meters.ln() - d0)).exp()
}

/// Fitness score for a result of `seconds` over `distance_meters`
///
/// Clamped to the table's range. Returns `None` for a non-positive time or
/// distance.
pub fn score_from_result(distance_meters: f64, seconds: f64) -> Option<f64> {
    if seconds <= 0.0 || distance_meters <= 0.0 {
        return None;
    }

    let column = matching_column(distance_meters);
    let times: Vec<f64> = VDOT_TABLE
        .iter()
        .map(|row| row_time(row, distance_meters, column))
        .collect();

    // First row at least as fast as the result
    let upper = times.partition_point(|t| *t > seconds);
    if upper == 0 {
        return Some(MIN_SCORE);
    }
    if upper == times.len() {
        return Some(MAX_SCORE);
    }

    let lower = upper - 1;
    let fraction = (times[lower] - seconds) / (times[lower] - times[upper]);
    let (s0, s1) = (VDOT_TABLE[lower].score, VDOT_TABLE[upper].score);
    Some(s0 + fraction * (s1 - s0))
}

/// Predicted time in seconds over `distance_meters` for a fitness score
///
/// Scores outside the table are clamped. Returns `None` for a non-positive
/// score or distance.
pub fn time_from_score(score: f64, distance_meters: f64) -> Option<f64> {
    if score <= 0.0 || distance_meters <= 0.0 {
        return None;
    }

    let score = score.clamp(MIN_SCORE, MAX_SCORE);
    let column = matching_column(distance_meters);

    let upper = VDOT_TABLE.partition_point(|row| row.score < score);
    let upper_row = &VDOT_TABLE[upper.min(VDOT_TABLE.len() - 1)];
    if upper == 0 || upper_row.score == score {
        return Some(row_time(upper_row, distance_meters, column));
    }

    let lower_row = &VDOT_TABLE[upper - 1];
    let t0 = row_time(lower_row, distance_meters, column);
    let t1 = row_time(upper_row, distance_meters, column);
    let fraction = (score - lower_row.score) / (upper_row.score - lower_row.score);
    Some(t0 + fraction * (t1 - t0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_table_is_monotonic() {
        for pair in VDOT_TABLE.windows(2) {
            assert!(pair[1].score > pair[0].score);
            for column in 0..6 {
                assert!(pair[1].seconds[column] < pair[0].seconds[column]);
            }
        }
        for row in &VDOT_TABLE {
            assert!(row.seconds.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_exact_rows() {
        assert_close(score_from_result(5000.0, 1196.0).unwrap(), 50.0, 1e-9);
        assert_close(score_from_result(10_000.0, 2480.0).unwrap(), 50.0, 1e-9);
        assert_close(time_from_score(60.0, 42_195.0).unwrap(), 9802.0, 1e-9);
        assert_close(time_from_score(40.0, 5000.0).unwrap(), 1446.0, 1e-9);
    }

    #[test]
    fn test_interpolates_between_rows() {
        // Halfway between the 50 and 51 rows of the 5K column
        let midpoint = (VDOT_TABLE[20].seconds[2] + VDOT_TABLE[21].seconds[2]) / 2.0;
        assert_close(score_from_result(5000.0, midpoint).unwrap(), 50.5, 1e-9);
        assert_close(time_from_score(50.5, 5000.0).unwrap(), midpoint, 1e-9);
    }

    #[test]
    fn test_column_tolerance() {
        // 5.1 km still reads the 5K column
        assert_eq!(
            score_from_result(5100.0, 1196.0),
            score_from_result(5000.0, 1196.0)
        );
    }

    #[test]
    fn test_round_trip_all_distances() {
        for standard in StandardDistance::ALL {
            for score in [33.3, 41.0, 47.25, 58.6, 72.1, 84.4] {
                let time = time_from_score(score, standard.meters()).unwrap();
                let back = score_from_result(standard.meters(), time).unwrap();
                let again = time_from_score(back, standard.meters()).unwrap();
                assert!((again - time).abs() / time < 0.02, "{standard:?} at {score}");
            }
        }
    }

    #[test]
    fn test_faster_time_never_lowers_score() {
        for standard in StandardDistance::ALL {
            let slowest = VDOT_TABLE[0].seconds[standard.index()] * 1.2;
            let mut previous = 0.0;
            let mut seconds = slowest;
            while seconds > 150.0 {
                let score = score_from_result(standard.meters(), seconds).unwrap();
                assert!(score >= previous);
                previous = score;
                seconds -= 7.0;
            }
        }
    }

    #[test]
    fn test_clamped_at_extremes() {
        assert_eq!(score_from_result(5000.0, 3600.0), Some(MIN_SCORE));
        assert_eq!(score_from_result(5000.0, 600.0), Some(MAX_SCORE));
        assert_eq!(time_from_score(100.0, 5000.0), time_from_score(85.0, 5000.0));
        assert_eq!(time_from_score(12.0, 5000.0), time_from_score(30.0, 5000.0));
    }

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(score_from_result(5000.0, 0.0), None);
        assert_eq!(score_from_result(0.0, 1200.0), None);
        assert_eq!(time_from_score(0.0, 5000.0), None);
        assert_eq!(time_from_score(-3.0, 5000.0), None);
    }

    #[test]
    fn test_synthesized_column_between_standards() {
        let eight_k = time_from_score(50.0, 8000.0).unwrap();
        assert!(eight_k > VDOT_TABLE[20].seconds[2]);
        assert!(eight_k < VDOT_TABLE[20].seconds[3]);
        assert_close(score_from_result(8000.0, eight_k).unwrap(), 50.0, 1e-6);

        // Beyond the marathon the end pair is extrapolated
        let ultra = time_from_score(50.0, 50_000.0).unwrap();
        assert!(ultra > VDOT_TABLE[20].seconds[5]);
    }
}
