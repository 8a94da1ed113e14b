//! Regression detection for replay reports
//!
//! Compares a current replay report against a saved baseline.

use serde::{Deserialize, Serialize};

use crate::metrics::ReplayReport;

/// A detected regression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    /// Type of regression
    pub regression_type: RegressionType,

    /// Description of the regression
    pub description: String,

    /// Baseline value
    pub baseline_value: String,

    /// Current value
    pub current_value: String,

    /// Severity (0.0 - 1.0)
    pub severity: f64,
}

/// Type of regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionType {
    /// Horizon MAE increased
    MaeIncrease,
    /// Horizon MARD increased
    MardIncrease,
    /// Accuracy drifted within the current window
    DriftIncrease,
    /// Rule trigger rate moved
    TriggerRateChange,
}

/// Regression detector configuration
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Relative MAE increase (e.g., 0.10 = 10%)
    pub mae_threshold: f64,

    /// Absolute MARD increase in percentage points
    pub mard_threshold_pp: f64,

    /// Absolute drift deltaMae in mmol/L
    pub drift_threshold: f64,

    /// Absolute trigger-rate change (e.g., 0.05 = 5 points)
    pub trigger_rate_threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            mae_threshold: 0.10,
            mard_threshold_pp: 2.0,
            drift_threshold: 0.3,
            trigger_rate_threshold: 0.05,
        }
    }
}

/// Detector for finding regressions between replay runs
pub struct RegressionDetector {
    config: RegressionConfig,
}

impl RegressionDetector {
    /// Create a new regression detector
    pub fn new(config: RegressionConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RegressionConfig::default())
    }

    /// Compare a current report against a baseline
    pub fn detect(&self, baseline: &ReplayReport, current: &ReplayReport) -> Vec<Regression> {
        let mut regressions = Vec::new();

        for stats in &current.forecast_stats {
            let Some(base) = baseline.forecast_for(stats.horizon) else {
                continue;
            };

            if base.mae > 0.0 {
                let increase = (stats.mae - base.mae) / base.mae;
                if increase > self.config.mae_threshold {
                    regressions.push(Regression {
                        regression_type: RegressionType::MaeIncrease,
                        description: format!(
                            "{}-minute MAE increased by {:.1}%",
                            stats.horizon,
                            increase * 100.0
                        ),
                        baseline_value: format!("{:.3}", base.mae),
                        current_value: format!("{:.3}", stats.mae),
                        severity: (increase / 2.0).min(1.0),
                    });
                }
            }

            let mard_delta = stats.mard_pct - base.mard_pct;
            if mard_delta > self.config.mard_threshold_pp {
                regressions.push(Regression {
                    regression_type: RegressionType::MardIncrease,
                    description: format!(
                        "{}-minute MARD increased by {:.1} points",
                        stats.horizon, mard_delta
                    ),
                    baseline_value: format!("{:.1}%", base.mard_pct),
                    current_value: format!("{:.1}%", stats.mard_pct),
                    severity: (mard_delta / 10.0).min(1.0),
                });
            }
        }

        regressions.extend(self.check_drift(baseline, current));
        regressions.extend(self.check_trigger_rates(baseline, current));
        regressions
    }

    fn check_drift(&self, baseline: &ReplayReport, current: &ReplayReport) -> Vec<Regression> {
        current
            .drift_stats
            .iter()
            .filter_map(|drift| {
                let base_delta = baseline
                    .drift_for(drift.horizon)
                    .map(|d| d.delta_mae)
                    .unwrap_or(0.0);

                (drift.delta_mae > self.config.drift_threshold && drift.delta_mae > base_delta)
                    .then(|| Regression {
                        regression_type: RegressionType::DriftIncrease,
                        description: format!(
                            "{}-minute accuracy drifted by {:+.3} mmol/L",
                            drift.horizon, drift.delta_mae
                        ),
                        baseline_value: format!("{:+.3}", base_delta),
                        current_value: format!("{:+.3}", drift.delta_mae),
                        severity: drift.delta_mae.min(1.0),
                    })
            })
            .collect()
    }

    fn check_trigger_rates(
        &self,
        baseline: &ReplayReport,
        current: &ReplayReport,
    ) -> Vec<Regression> {
        current
            .rule_stats
            .iter()
            .filter_map(|rule| {
                let base = baseline.rule(&rule.rule_id)?;
                if base.total() == 0 || rule.total() == 0 {
                    return None;
                }

                let change = rule.trigger_rate() - base.trigger_rate();
                (change.abs() > self.config.trigger_rate_threshold).then(|| Regression {
                    regression_type: RegressionType::TriggerRateChange,
                    description: format!(
                        "{} trigger rate changed by {:+.1} points",
                        rule.rule_id,
                        change * 100.0
                    ),
                    baseline_value: format!("{:.1}%", base.trigger_rate() * 100.0),
                    current_value: format!("{:.1}%", rule.trigger_rate() * 100.0),
                    severity: (change.abs() * 4.0).min(1.0),
                })
            })
            .collect()
    }

    /// Generate a summary of regressions
    pub fn summarize(regressions: &[Regression]) -> String {
        if regressions.is_empty() {
            return "No regressions detected.".to_string();
        }

        let mut summary = format!("Found {} regression(s):\n", regressions.len());

        for (i, reg) in regressions.iter().enumerate() {
            summary.push_str(&format!(
                "  {}. [{:?}] {} (severity: {:.0}%)\n",
                i + 1,
                reg.regression_type,
                reg.description,
                reg.severity * 100.0
            ));
        }

        summary
    }
}
