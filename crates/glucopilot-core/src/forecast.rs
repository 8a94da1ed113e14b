//! Short-horizon glucose forecasting
//!
//! The model is a deterministic trend extrapolator: a slope over the last few
//! readings is projected forward for the 5-minute horizon, and added to the
//! recent mean for the 60-minute horizon.

use crate::types::{Forecast, GlucoseReading, MINUTE_MS};

/// Model version reported for the 5-minute horizon
pub const HF_MODEL_VERSION: &str = "cloud-hf-v1";

/// Model version reported for the 60-minute horizon
pub const ENSEMBLE_MODEL_VERSION: &str = "cloud-ensemble-v1";

/// Reason codes attached to every prediction response
pub const REASON_CODES: [&str; 2] = ["trend", "local_ensemble"];

/// Lowest value a confidence band may report
const CI_FLOOR_MMOL: f64 = 2.2;

const SLOPE_LOOKBACK: usize = 6;
const MEAN_WINDOW: usize = 24;
const FIVE_MINUTES_MS: f64 = 5.0 * 60.0 * 1000.0;

/// Produces point forecasts from a glucose history
pub trait Forecaster: Send + Sync {
    /// Forecast from readings in any order; empty input yields no forecasts
    fn forecast(&self, readings: &[GlucoseReading]) -> Vec<Forecast>;
}

/// Trend extrapolator producing 5- and 60-minute forecasts
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendForecaster;

impl Forecaster for TrendForecaster {
    fn forecast(&self, readings: &[GlucoseReading]) -> Vec<Forecast> {
        forecast(readings)
    }
}

/// Change per 5 minutes between the latest reading and the one 6 back
///
/// `sorted` must be ordered by timestamp.
fn slope_per_5m(sorted: &[GlucoseReading]) -> f64 {
    if sorted.len() < 2 {
        return 0.0;
    }
    let last = &sorted[sorted.len() - 1];
    let reference = if sorted.len() >= SLOPE_LOOKBACK {
        &sorted[sorted.len() - SLOPE_LOOKBACK]
    } else {
        &sorted[0]
    };
    let dt = last.ts.saturating_sub(reference.ts).max(1) as f64;
    (last.value_mmol - reference.value_mmol) / dt * FIVE_MINUTES_MS
}

fn band(value: f64, half_width: f64) -> (f64, f64) {
    ((value - half_width).max(CI_FLOOR_MMOL), value + half_width)
}

/// Forecast glucose 5 and 60 minutes past the latest reading
pub fn forecast(readings: &[GlucoseReading]) -> Vec<Forecast> {
    if readings.is_empty() {
        return Vec::new();
    }

    let mut sorted = readings.to_vec();
    sorted.sort_by_key(|r| r.ts);

    let latest = &sorted[sorted.len() - 1];
    let slope = slope_per_5m(&sorted);

    let value_5 = latest.value_mmol + slope;

    let window = &sorted[sorted.len().saturating_sub(MEAN_WINDOW)..];
    let base = window.iter().map(|r| r.value_mmol).sum::<f64>() / window.len() as f64;
    let value_60 = base + slope * 12.0;

    let (low_5, high_5) = band(value_5, 0.45);
    let (low_60, high_60) = band(value_60, 1.2);

    vec![
        Forecast {
            ts: latest.ts.saturating_add(5 * MINUTE_MS),
            horizon: 5,
            value_mmol: value_5,
            ci_low: low_5,
            ci_high: high_5,
            model_version: HF_MODEL_VERSION.to_string(),
        },
        Forecast {
            ts: latest.ts.saturating_add(60 * MINUTE_MS),
            horizon: 60,
            value_mmol: value_60,
            ci_low: low_60,
            ci_high: high_60,
            model_version: ENSEMBLE_MODEL_VERSION.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<GlucoseReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| GlucoseReading::new(i as i64 * 5 * MINUTE_MS, *v, "test"))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(forecast(&[]).is_empty());
    }

    #[test]
    fn test_single_reading_is_flat() {
        let result = forecast(&series(&[6.0]));

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].value_mmol, 6.0);
        assert_eq!(result[1].value_mmol, 6.0);
        assert_eq!(result[0].ts, 5 * MINUTE_MS);
        assert_eq!(result[1].ts, 60 * MINUTE_MS);
    }

    #[test]
    fn test_rising_trend() {
        // +0.1 per reading, 5 minutes apart
        let readings = series(&[5.0, 5.1, 5.2, 5.3, 5.4, 5.5, 5.6]);
        let result = forecast(&readings);

        // reference is 5.1 at t=5m, latest 5.6 at t=30m: 0.5 over 25 minutes
        let slope = 0.5 / 5.0;
        assert!((result[0].value_mmol - (5.6 + slope)).abs() < 1e-9);

        let mean = readings.iter().map(|r| r.value_mmol).sum::<f64>() / 7.0;
        assert!((result[1].value_mmol - (mean + slope * 12.0)).abs() < 1e-9);

        assert_eq!(result[0].model_version, HF_MODEL_VERSION);
        assert_eq!(result[1].model_version, ENSEMBLE_MODEL_VERSION);
    }

    #[test]
    fn test_unsorted_input_matches_sorted() {
        let readings = series(&[5.0, 5.4, 6.1, 6.0, 5.8]);
        let mut shuffled = readings.clone();
        shuffled.reverse();

        assert_eq!(forecast(&readings), forecast(&shuffled));
    }

    #[test]
    fn test_bands_contain_value() {
        let result = forecast(&series(&[7.0, 7.2, 7.1, 7.4, 7.3]));
        for fc in &result {
            assert!(fc.ci_low <= fc.value_mmol);
            assert!(fc.value_mmol <= fc.ci_high);
        }
        assert!((result[0].ci_high - result[0].value_mmol - 0.45).abs() < 1e-9);
        assert!((result[1].ci_high - result[1].value_mmol - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_band_floor() {
        let result = forecast(&series(&[2.4, 2.4]));
        assert_eq!(result[0].ci_low, 2.2);
        assert_eq!(result[1].ci_low, 2.2);
    }

    #[test]
    fn test_identical_timestamps_do_not_divide_by_zero() {
        let readings = vec![
            GlucoseReading::new(1000, 5.0, "a"),
            GlucoseReading::new(1000, 6.0, "b"),
        ];
        let result = forecast(&readings);
        assert!(result.iter().all(|f| f.value_mmol.is_finite()));
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let readings = vec![
            GlucoseReading::new(i64::MIN, 5.0, "a"),
            GlucoseReading::new(i64::MAX - MINUTE_MS, 6.0, "a"),
        ];
        let result = forecast(&readings);

        assert_eq!(result[0].ts, i64::MAX);
        assert_eq!(result[1].ts, i64::MAX);
        assert!(result.iter().all(|f| f.value_mmol.is_finite()));
    }
}
