//! Report generation for replay results
//!
//! Renders a [`ReplayReport`] as JSON, Markdown or a terminal table.

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{TimeZone, Utc};

use crate::metrics::ReplayReport;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    Json,
    Markdown,
    #[default]
    Table,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "table" => Ok(ReportFormat::Table),
            other => Err(format!(
                "unknown report format '{}' (expected json, markdown or table)",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Table => write!(f, "table"),
        }
    }
}

/// Generate a report in the specified format
pub fn generate_report(report: &ReplayReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(report),
        ReportFormat::Markdown => MarkdownReporter::generate(report),
        ReportFormat::Table => generate_table(report),
    }
}

/// Render a millisecond timestamp as UTC
pub(crate) fn format_ts(ts: i64) -> String {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Generate a simple table report for terminal output
fn generate_table(report: &ReplayReport) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Glucopilot Replay Results "));
    output.push_str(&format!(
        "Window: {} -> {} | Points: {}\n",
        format_ts(report.since),
        format_ts(report.until),
        report.points
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    if !report.has_forecast_samples() {
        output.push_str("Not enough data in window to replay.\n\n");
    }

    output.push_str("FORECAST ACCURACY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<12} {:>10} {:>12} {:>12} {:>12}\n",
        "Horizon", "Samples", "MAE", "RMSE", "MARD"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for stats in &report.forecast_stats {
        output.push_str(&format!(
            "{:<12} {:>10} {:>12.3} {:>12.3} {:>11.1}%\n",
            format!("{} min", stats.horizon),
            stats.sample_count,
            stats.mae,
            stats.rmse,
            stats.mard_pct
        ));
    }
    output.push_str(&format!("{:-<70}\n\n", ""));

    output.push_str("RULES\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>12} {:>12} {:>12}\n",
        "Rule", "Triggered", "Blocked", "No match"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for rule in &report.rule_stats {
        output.push_str(&format!(
            "{:<30} {:>12} {:>12} {:>12}\n",
            rule.rule_id, rule.triggered, rule.blocked, rule.no_match
        ));
    }
    output.push_str(&format!("{:-<70}\n\n", ""));

    if !report.day_type_stats.is_empty() {
        output.push_str("BY DAY TYPE\n");
        output.push_str(&format!("{:-<70}\n", ""));
        for day in &report.day_type_stats {
            for stats in &day.forecast_stats {
                output.push_str(&format!(
                    "{:<12} {:<8} {:>8} {:>12.3} {:>12.3} {:>11.1}%\n",
                    day.day_type.as_str(),
                    format!("{} min", stats.horizon),
                    stats.sample_count,
                    stats.mae,
                    stats.rmse,
                    stats.mard_pct
                ));
            }
        }
        output.push_str(&format!("{:-<70}\n\n", ""));
    }

    if !report.hourly_stats.is_empty() {
        output.push_str("BY HOUR (UTC)\n");
        output.push_str(&format!("{:-<70}\n", ""));
        for hour in &report.hourly_stats {
            output.push_str(&format!(
                "{:02}:00        {:>10} {:>12.3} {:>12.3} {:>11.1}%\n",
                hour.hour, hour.sample_count, hour.mae, hour.rmse, hour.mard_pct
            ));
        }
        output.push_str(&format!("{:-<70}\n\n", ""));
    }

    if !report.drift_stats.is_empty() {
        output.push_str("DRIFT\n");
        output.push_str(&format!("{:-<70}\n", ""));
        output.push_str(&format!(
            "{:<12} {:>16} {:>16} {:>16}\n",
            "Horizon", "Previous MAE", "Recent MAE", "Delta"
        ));
        for drift in &report.drift_stats {
            output.push_str(&format!(
                "{:<12} {:>16.3} {:>16.3} {:>+16.3}\n",
                format!("{} min", drift.horizon),
                drift.previous_mae,
                drift.recent_mae,
                drift.delta_mae
            ));
        }
    }

    output.push_str(&format!("{:=<70}\n", ""));

    Ok(output)
}
