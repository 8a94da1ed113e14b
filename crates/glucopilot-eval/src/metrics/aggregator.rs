//! Statistics aggregation for replay runs
//!
//! Turns the samples gathered by [`ErrorCollector`] into the per-horizon,
//! day-type, hour-of-day and drift views of a [`ReplayReport`].

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};

use super::collector::ErrorCollector;
use super::types::{
    AccuracySummary, DayType, DayTypeStats, DriftStats, ErrorSample, ForecastStats, HourStats,
    ReplayReport,
};

/// Horizon preferred for the hour-of-day view
pub const PREFERRED_HOURLY_HORIZON: u32 = 5;

/// Minimum samples a horizon needs before drift is measured
pub const MIN_DRIFT_SAMPLES: usize = 10;

/// Aggregator for computing report statistics from collected samples
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Build the final report for a replay window
    pub fn aggregate(
        &self,
        since: i64,
        until: i64,
        points: usize,
        collector: &ErrorCollector,
    ) -> ReplayReport {
        let by_horizon = collector.by_horizon();

        ReplayReport {
            since,
            until,
            points,
            forecast_stats: self.forecast_stats(by_horizon),
            rule_stats: vec![collector.rule_stats().clone()],
            day_type_stats: self.day_type_stats(by_horizon),
            hourly_stats: self.hourly_stats(by_horizon),
            drift_stats: self.drift_stats(by_horizon),
        }
    }

    /// Per-horizon accuracy, ascending horizon
    pub fn forecast_stats(&self, by_horizon: &BTreeMap<u32, Vec<ErrorSample>>) -> Vec<ForecastStats> {
        by_horizon
            .iter()
            .filter_map(|(&horizon, samples)| {
                AccuracySummary::from_samples(samples).map(|s| ForecastStats::new(horizon, s))
            })
            .collect()
    }

    /// Per-horizon accuracy split by UTC day type; always WEEKDAY then WEEKEND
    pub fn day_type_stats(&self, by_horizon: &BTreeMap<u32, Vec<ErrorSample>>) -> Vec<DayTypeStats> {
        DayType::ALL
            .iter()
            .map(|&day_type| {
                let forecast_stats = by_horizon
                    .iter()
                    .filter_map(|(&horizon, samples)| {
                        let matching = samples
                            .iter()
                            .filter(|s| day_type_of(s.actual_ts) == Some(day_type));
                        AccuracySummary::from_samples(matching)
                            .map(|s| ForecastStats::new(horizon, s))
                    })
                    .collect();

                DayTypeStats {
                    day_type,
                    forecast_stats,
                }
            })
            .collect()
    }

    /// Accuracy of the reference horizon bucketed by UTC hour of day
    pub fn hourly_stats(&self, by_horizon: &BTreeMap<u32, Vec<ErrorSample>>) -> Vec<HourStats> {
        let Some(samples) = reference_horizon(by_horizon).and_then(|h| by_horizon.get(&h)) else {
            return Vec::new();
        };

        let mut buckets: BTreeMap<u32, Vec<&ErrorSample>> = BTreeMap::new();
        for sample in samples {
            if let Some(hour) = utc_datetime(sample.actual_ts).map(|dt| dt.hour()) {
                buckets.entry(hour).or_default().push(sample);
            }
        }

        buckets
            .into_iter()
            .filter_map(|(hour, bucket)| {
                AccuracySummary::from_samples(bucket).map(|s| HourStats::new(hour, s))
            })
            .collect()
    }

    /// MAE drift between the earlier and later half of each horizon
    pub fn drift_stats(&self, by_horizon: &BTreeMap<u32, Vec<ErrorSample>>) -> Vec<DriftStats> {
        by_horizon
            .iter()
            .filter(|(_, samples)| samples.len() >= MIN_DRIFT_SAMPLES)
            .filter_map(|(&horizon, samples)| {
                let mut ordered: Vec<&ErrorSample> = samples.iter().collect();
                ordered.sort_by_key(|s| s.actual_ts);

                let (previous, recent) = ordered.split_at(ordered.len() / 2);
                let previous_mae = AccuracySummary::from_samples(previous.iter().copied())?.mae;
                let recent_mae = AccuracySummary::from_samples(recent.iter().copied())?.mae;

                Some(DriftStats {
                    horizon,
                    previous_mae,
                    recent_mae,
                    delta_mae: recent_mae - previous_mae,
                })
            })
            .collect()
    }
}

/// Horizon 5 when present, else the smallest collected horizon
fn reference_horizon(by_horizon: &BTreeMap<u32, Vec<ErrorSample>>) -> Option<u32> {
    if by_horizon.contains_key(&PREFERRED_HOURLY_HORIZON) {
        Some(PREFERRED_HOURLY_HORIZON)
    } else {
        by_horizon.keys().next().copied()
    }
}

fn utc_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts).single()
}

/// UTC day type of a millisecond timestamp
pub fn day_type_of(ts: i64) -> Option<DayType> {
    utc_datetime(ts).map(|dt| match dt.weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ => DayType::Weekday,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucopilot_core::{HOUR_MS, RuleState};

    // 2024-01-01T00:00:00Z, a Monday
    const MONDAY: i64 = 1_704_067_200_000;
    // 2024-01-06T00:00:00Z, a Saturday
    const SATURDAY: i64 = 1_704_499_200_000;

    fn sample(horizon: u32, error: f64, actual_ts: i64) -> ErrorSample {
        ErrorSample {
            horizon,
            absolute_error: error,
            squared_error: error * error,
            absolute_relative_difference: 0.0,
            actual_ts,
        }
    }

    fn collector_with(samples: &[ErrorSample]) -> ErrorCollector {
        let mut collector = ErrorCollector::new("rule");
        for sample in samples {
            collector.record_sample(*sample);
        }
        collector
    }

    #[test]
    fn test_forecast_stats_ascending() {
        let collector = collector_with(&[
            sample(60, 2.0, MONDAY),
            sample(5, 1.0, MONDAY),
            sample(5, 3.0, MONDAY),
        ]);
        let stats = StatisticsAggregator::new().forecast_stats(collector.by_horizon());

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].horizon, 5);
        assert_eq!(stats[0].sample_count, 2);
        assert_eq!(stats[0].mae, 2.0);
        assert_eq!(stats[1].horizon, 60);
    }

    #[test]
    fn test_day_type_classification() {
        assert_eq!(day_type_of(MONDAY), Some(DayType::Weekday));
        assert_eq!(day_type_of(SATURDAY), Some(DayType::Weekend));
        assert_eq!(day_type_of(SATURDAY + 24 * HOUR_MS), Some(DayType::Weekend));
        assert_eq!(day_type_of(SATURDAY + 48 * HOUR_MS), Some(DayType::Weekday));
    }

    #[test]
    fn test_day_type_stats_always_both() {
        let collector = collector_with(&[sample(5, 1.0, MONDAY), sample(5, 3.0, MONDAY)]);
        let stats = StatisticsAggregator::new().day_type_stats(collector.by_horizon());

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].day_type, DayType::Weekday);
        assert_eq!(stats[0].forecast_stats[0].sample_count, 2);
        assert_eq!(stats[1].day_type, DayType::Weekend);
        assert!(stats[1].forecast_stats.is_empty());
    }

    #[test]
    fn test_day_type_partition() {
        let collector = collector_with(&[
            sample(5, 1.0, MONDAY),
            sample(5, 2.0, SATURDAY),
            sample(5, 4.0, SATURDAY + HOUR_MS),
        ]);
        let stats = StatisticsAggregator::new().day_type_stats(collector.by_horizon());

        let weekday = &stats[0].forecast_stats[0];
        let weekend = &stats[1].forecast_stats[0];
        assert_eq!(weekday.sample_count + weekend.sample_count, 3);
        assert_eq!(weekday.mae, 1.0);
        assert_eq!(weekend.mae, 3.0);
    }

    #[test]
    fn test_hourly_prefers_horizon_five() {
        let collector = collector_with(&[
            sample(5, 1.0, MONDAY + 3 * HOUR_MS),
            sample(5, 2.0, MONDAY + HOUR_MS),
            sample(5, 4.0, MONDAY + HOUR_MS + 10),
            sample(60, 9.0, MONDAY + 7 * HOUR_MS),
        ]);
        let stats = StatisticsAggregator::new().hourly_stats(collector.by_horizon());

        let hours: Vec<u32> = stats.iter().map(|s| s.hour).collect();
        assert_eq!(hours, vec![1, 3]);
        assert_eq!(stats[0].sample_count, 2);
        assert_eq!(stats[0].mae, 3.0);
    }

    #[test]
    fn test_hourly_falls_back_to_smallest_horizon() {
        let collector = collector_with(&[
            sample(60, 1.0, MONDAY + 5 * HOUR_MS),
            sample(30, 2.0, MONDAY + 2 * HOUR_MS),
        ]);
        let stats = StatisticsAggregator::new().hourly_stats(collector.by_horizon());

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].hour, 2);
        assert_eq!(stats[0].mae, 2.0);
    }

    #[test]
    fn test_hourly_empty() {
        let collector = ErrorCollector::new("rule");
        assert!(
            StatisticsAggregator::new()
                .hourly_stats(collector.by_horizon())
                .is_empty()
        );
    }

    #[test]
    fn test_drift_split_eleven() {
        // First five samples carry error 1.0, the remaining six carry 2.0
        let samples: Vec<ErrorSample> = (0..11)
            .map(|i| sample(5, if i < 5 { 1.0 } else { 2.0 }, MONDAY + i * 300_000))
            .collect();
        let collector = collector_with(&samples);
        let drift = StatisticsAggregator::new().drift_stats(collector.by_horizon());

        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].horizon, 5);
        assert_eq!(drift[0].previous_mae, 1.0);
        assert_eq!(drift[0].recent_mae, 2.0);
        assert_eq!(drift[0].delta_mae, 1.0);
    }

    #[test]
    fn test_drift_sorts_by_actual_timestamp() {
        let samples: Vec<ErrorSample> = (0..10)
            .rev()
            .map(|i| sample(60, if i < 5 { 3.0 } else { 1.0 }, MONDAY + i * 300_000))
            .collect();
        let collector = collector_with(&samples);
        let drift = StatisticsAggregator::new().drift_stats(collector.by_horizon());

        assert_eq!(drift[0].previous_mae, 3.0);
        assert_eq!(drift[0].recent_mae, 1.0);
        assert_eq!(drift[0].delta_mae, -2.0);
    }

    #[test]
    fn test_drift_requires_ten_samples() {
        let samples: Vec<ErrorSample> = (0..9).map(|i| sample(5, 1.0, MONDAY + i)).collect();
        let collector = collector_with(&samples);
        assert!(
            StatisticsAggregator::new()
                .drift_stats(collector.by_horizon())
                .is_empty()
        );
    }

    #[test]
    fn test_aggregate_carries_rule_row() {
        let mut collector = collector_with(&[sample(5, 1.0, MONDAY)]);
        collector.record_decision(RuleState::NoMatch);
        let report = StatisticsAggregator::new().aggregate(0, 10, 42, &collector);

        assert_eq!(report.points, 42);
        assert_eq!(report.rule_stats.len(), 1);
        assert_eq!(report.rule_stats[0].no_match, 1);
        assert_eq!(report.forecast_stats.len(), 1);
        assert_eq!(report.day_type_stats.len(), 2);
    }
}
