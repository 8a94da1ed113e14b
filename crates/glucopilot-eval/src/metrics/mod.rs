//! Metrics collection and aggregation for replay runs
//!
//! This module provides the error samples gathered while replaying history
//! and the statistics derived from them.

mod aggregator;
mod collector;
mod types;

pub use aggregator::{
    MIN_DRIFT_SAMPLES, PREFERRED_HOURLY_HORIZON, StatisticsAggregator, day_type_of,
};
pub use collector::ErrorCollector;
pub use types::{
    AccuracySummary, DayType, DayTypeStats, DriftStats, ErrorSample, ForecastStats, HourStats,
    ReplayReport, RuleStats,
};
