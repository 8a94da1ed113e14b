//! Markdown report generation

use anyhow::Result;

use super::format_ts;
use crate::metrics::{ForecastStats, ReplayReport};

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(report: &ReplayReport) -> Result<String> {
        let mut md = String::new();

        md.push_str("# Glucopilot Replay Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Since**: {}\n", format_ts(report.since)));
        md.push_str(&format!("- **Until**: {}\n", format_ts(report.until)));
        md.push_str(&format!("- **Points**: {}\n\n", report.points));

        md.push_str("## Forecast Accuracy\n\n");
        if report.forecast_stats.is_empty() {
            md.push_str("_Not enough data in window to replay._\n\n");
        } else {
            Self::forecast_table(&mut md, &report.forecast_stats);
        }

        md.push_str("## Rules\n\n");
        md.push_str("| Rule | Triggered | Blocked | No match |\n");
        md.push_str("|------|-----------|---------|----------|\n");
        for rule in &report.rule_stats {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                rule.rule_id, rule.triggered, rule.blocked, rule.no_match
            ));
        }
        md.push('\n');

        if !report.day_type_stats.is_empty() {
            md.push_str("## By Day Type\n\n");
            for day in &report.day_type_stats {
                md.push_str(&format!("### {}\n\n", day.day_type.as_str()));
                if day.forecast_stats.is_empty() {
                    md.push_str("_No samples._\n\n");
                } else {
                    Self::forecast_table(&mut md, &day.forecast_stats);
                }
            }
        }

        if !report.hourly_stats.is_empty() {
            md.push_str("## By Hour (UTC)\n\n");
            md.push_str("| Hour | Samples | MAE | RMSE | MARD |\n");
            md.push_str("|------|---------|-----|------|------|\n");
            for hour in &report.hourly_stats {
                md.push_str(&format!(
                    "| {:02}:00 | {} | {:.3} | {:.3} | {:.1}% |\n",
                    hour.hour, hour.sample_count, hour.mae, hour.rmse, hour.mard_pct
                ));
            }
            md.push('\n');
        }

        if !report.drift_stats.is_empty() {
            md.push_str("## Drift\n\n");
            md.push_str("| Horizon | Previous MAE | Recent MAE | Delta |\n");
            md.push_str("|---------|--------------|------------|-------|\n");
            for drift in &report.drift_stats {
                md.push_str(&format!(
                    "| {} min | {:.3} | {:.3} | {:+.3} |\n",
                    drift.horizon, drift.previous_mae, drift.recent_mae, drift.delta_mae
                ));
            }
            md.push('\n');
        }

        Ok(md)
    }

    fn forecast_table(md: &mut String, stats: &[ForecastStats]) {
        md.push_str("| Horizon | Samples | MAE | RMSE | MARD |\n");
        md.push_str("|---------|---------|-----|------|------|\n");
        for s in stats {
            md.push_str(&format!(
                "| {} min | {} | {:.3} | {:.3} | {:.1}% |\n",
                s.horizon, s.sample_count, s.mae, s.rmse, s.mard_pct
            ));
        }
        md.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DayType, DayTypeStats, DriftStats, HourStats};

    fn create_test_report() -> ReplayReport {
        let stats = ForecastStats {
            horizon: 5,
            sample_count: 12,
            mae: 0.2,
            rmse: 0.25,
            mard_pct: 3.5,
        };
        let mut report = ReplayReport::insufficient(0, 3_600_000, 40, "PostHypoReboundGuard.v1");
        report.forecast_stats = vec![stats.clone()];
        report.day_type_stats = vec![
            DayTypeStats {
                day_type: DayType::Weekday,
                forecast_stats: vec![stats],
            },
            DayTypeStats {
                day_type: DayType::Weekend,
                forecast_stats: Vec::new(),
            },
        ];
        report.hourly_stats = vec![HourStats {
            hour: 7,
            sample_count: 12,
            mae: 0.2,
            rmse: 0.25,
            mard_pct: 3.5,
        }];
        report.drift_stats = vec![DriftStats {
            horizon: 5,
            previous_mae: 0.1,
            recent_mae: 0.3,
            delta_mae: 0.2,
        }];
        report
    }

    #[test]
    fn test_markdown_generation() {
        let md = MarkdownReporter::generate(&create_test_report()).unwrap();

        assert!(md.contains("# Glucopilot Replay Report"));
        assert!(md.contains("- **Since**: 1970-01-01 00:00 UTC"));
        assert!(md.contains("| 5 min | 12 | 0.200 | 0.250 | 3.5% |"));
        assert!(md.contains("### WEEKEND\n\n_No samples._"));
        assert!(md.contains("| 07:00 | 12 |"));
        assert!(md.contains("| 5 min | 0.100 | 0.300 | +0.200 |"));
    }

    #[test]
    fn test_markdown_insufficient() {
        let report = ReplayReport::insufficient(0, 1, 2, "r");
        let md = MarkdownReporter::generate(&report).unwrap();
        assert!(md.contains("_Not enough data in window to replay._"));
        assert!(md.contains("| r | 0 | 0 | 0 |"));
        assert!(!md.contains("## Drift"));
    }
}
