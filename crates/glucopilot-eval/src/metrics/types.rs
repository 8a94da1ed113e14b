//! Core metric types for replay evaluation
//!
//! Defines the error samples collected during a replay and the statistic
//! views reported at the end of it.

use glucopilot_core::{GlucoseReading, RuleState};
use serde::{Deserialize, Serialize};

/// Error of one matched forecast against the observed reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSample {
    /// Forecast horizon in minutes
    pub horizon: u32,

    /// |actual - predicted|
    pub absolute_error: f64,

    /// (actual - predicted)^2
    pub squared_error: f64,

    /// |actual - predicted| / actual, 0 when actual is not positive
    pub absolute_relative_difference: f64,

    /// Timestamp of the observed reading
    pub actual_ts: i64,
}

impl ErrorSample {
    /// Score a predicted value against the reading it was matched with
    pub fn score(horizon: u32, predicted: f64, actual: &GlucoseReading) -> Self {
        let absolute_error = (actual.value_mmol - predicted).abs();
        let absolute_relative_difference = if actual.value_mmol > 0.0 {
            absolute_error / actual.value_mmol
        } else {
            0.0
        };

        Self {
            horizon,
            absolute_error,
            squared_error: absolute_error * absolute_error,
            absolute_relative_difference,
            actual_ts: actual.ts,
        }
    }
}

/// MAE / RMSE / MARD over a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracySummary {
    pub sample_count: usize,
    pub mae: f64,
    pub rmse: f64,
    pub mard_pct: f64,
}

impl AccuracySummary {
    /// Summarize samples; `None` when there are none
    pub fn from_samples<'a, I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ErrorSample>,
    {
        let mut count = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut ard_sum = 0.0;

        for sample in samples {
            count += 1;
            abs_sum += sample.absolute_error;
            sq_sum += sample.squared_error;
            ard_sum += sample.absolute_relative_difference;
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self {
            sample_count: count,
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            mard_pct: ard_sum / n * 100.0,
        })
    }
}

/// Accuracy of one forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastStats {
    pub horizon: u32,
    pub sample_count: usize,
    pub mae: f64,
    pub rmse: f64,
    pub mard_pct: f64,
}

impl ForecastStats {
    pub fn new(horizon: u32, summary: AccuracySummary) -> Self {
        Self {
            horizon,
            sample_count: summary.sample_count,
            mae: summary.mae,
            rmse: summary.rmse,
            mard_pct: summary.mard_pct,
        }
    }
}

/// Outcome tally of one rule across all simulated steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStats {
    pub rule_id: String,
    pub triggered: u32,
    pub blocked: u32,
    pub no_match: u32,
}

impl RuleStats {
    /// A zeroed tally
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            triggered: 0,
            blocked: 0,
            no_match: 0,
        }
    }

    /// Count one decision
    pub fn record(&mut self, state: RuleState) {
        match state {
            RuleState::Triggered => self.triggered += 1,
            RuleState::Blocked => self.blocked += 1,
            RuleState::NoMatch => self.no_match += 1,
        }
    }

    /// Number of evaluations tallied
    pub fn total(&self) -> u32 {
        self.triggered + self.blocked + self.no_match
    }

    /// Share of evaluations that triggered
    pub fn trigger_rate(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            self.triggered as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Calendar day classification (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Both day types in report order
    pub const ALL: [DayType; 2] = [DayType::Weekday, DayType::Weekend];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "WEEKDAY",
            DayType::Weekend => "WEEKEND",
        }
    }
}

/// Per-horizon accuracy within one day type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTypeStats {
    pub day_type: DayType,
    pub forecast_stats: Vec<ForecastStats>,
}

/// Accuracy of the reference horizon within one UTC hour of day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStats {
    pub hour: u32,
    pub sample_count: usize,
    pub mae: f64,
    pub rmse: f64,
    pub mard_pct: f64,
}

impl HourStats {
    pub fn new(hour: u32, summary: AccuracySummary) -> Self {
        Self {
            hour,
            sample_count: summary.sample_count,
            mae: summary.mae,
            rmse: summary.rmse,
            mard_pct: summary.mard_pct,
        }
    }
}

/// MAE change between the earlier and later half of a horizon's samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftStats {
    pub horizon: u32,
    pub previous_mae: f64,
    pub recent_mae: f64,
    pub delta_mae: f64,
}

/// Result of one replay run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// Window start (inclusive, unix milliseconds)
    pub since: i64,

    /// Window end (inclusive, unix milliseconds)
    pub until: i64,

    /// Glucose readings inside the window
    pub points: usize,

    pub forecast_stats: Vec<ForecastStats>,
    pub rule_stats: Vec<RuleStats>,
    pub day_type_stats: Vec<DayTypeStats>,
    pub hourly_stats: Vec<HourStats>,
    pub drift_stats: Vec<DriftStats>,
}

impl ReplayReport {
    /// Report for a window with too little data to simulate
    pub fn insufficient(since: i64, until: i64, points: usize, rule_id: &str) -> Self {
        Self {
            since,
            until,
            points,
            forecast_stats: Vec::new(),
            rule_stats: vec![RuleStats::new(rule_id)],
            day_type_stats: Vec::new(),
            hourly_stats: Vec::new(),
            drift_stats: Vec::new(),
        }
    }

    /// Forecast stats for a horizon
    pub fn forecast_for(&self, horizon: u32) -> Option<&ForecastStats> {
        self.forecast_stats.iter().find(|s| s.horizon == horizon)
    }

    /// Drift stats for a horizon
    pub fn drift_for(&self, horizon: u32) -> Option<&DriftStats> {
        self.drift_stats.iter().find(|s| s.horizon == horizon)
    }

    /// Rule tally by id
    pub fn rule(&self, rule_id: &str) -> Option<&RuleStats> {
        self.rule_stats.iter().find(|s| s.rule_id == rule_id)
    }

    /// Whether any forecast could be scored
    pub fn has_forecast_samples(&self) -> bool {
        !self.forecast_stats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(error: f64) -> ErrorSample {
        ErrorSample {
            horizon: 5,
            absolute_error: error,
            squared_error: error * error,
            absolute_relative_difference: error / 10.0,
            actual_ts: 0,
        }
    }

    #[test]
    fn test_accuracy_closed_form() {
        let samples = vec![sample(1.0), sample(2.0), sample(3.0)];
        let summary = AccuracySummary::from_samples(&samples).unwrap();

        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.mae, 2.0);
        assert!((summary.rmse - (14.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((summary.rmse - 2.160).abs() < 1e-3);
        assert!((summary.mard_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_empty() {
        assert!(AccuracySummary::from_samples(&Vec::<ErrorSample>::new()).is_none());
    }

    #[test]
    fn test_score_against_reading() {
        let actual = GlucoseReading::new(42, 8.0, "cgm");
        let sample = ErrorSample::score(5, 6.0, &actual);

        assert_eq!(sample.absolute_error, 2.0);
        assert_eq!(sample.squared_error, 4.0);
        assert_eq!(sample.absolute_relative_difference, 0.25);
        assert_eq!(sample.actual_ts, 42);
    }

    #[test]
    fn test_score_zero_actual() {
        let actual = GlucoseReading::new(0, 0.0, "cgm");
        let sample = ErrorSample::score(60, 1.5, &actual);
        assert_eq!(sample.absolute_relative_difference, 0.0);
        assert_eq!(sample.absolute_error, 1.5);
    }

    #[test]
    fn test_rule_stats_tally() {
        let mut stats = RuleStats::new("r");
        stats.record(RuleState::Triggered);
        stats.record(RuleState::NoMatch);
        stats.record(RuleState::NoMatch);
        stats.record(RuleState::Blocked);

        assert_eq!(stats.total(), 4);
        assert_eq!(stats.trigger_rate(), 0.25);
        assert_eq!(RuleStats::new("r").trigger_rate(), 0.0);
    }

    #[test]
    fn test_report_wire_names() {
        let report = ReplayReport::insufficient(1, 2, 7, "PostHypoReboundGuard.v1");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["points"], 7);
        assert_eq!(json["forecastStats"], serde_json::json!([]));
        assert_eq!(json["ruleStats"][0]["noMatch"], 0);
        assert!(json.get("dayTypeStats").is_some());
        assert!(json.get("hourlyStats").is_some());
        assert!(json.get("driftStats").is_some());
        assert_eq!(serde_json::to_value(DayType::Weekend).unwrap(), "WEEKEND");
    }
}
