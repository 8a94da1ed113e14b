//! Daily analysis commands

use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use colored::*;
use glucopilot_core::DAY_MS;
use glucopilot_store::{AnalysisFilter, AnalysisHistoryRecord, WeeklyTrendRecord};

use crate::console::{CliConsole, format_ts, status_label};
use crate::context::AppContext;

/// Run the daily analysis for a date (today when omitted)
pub async fn daily(
    ctx: &AppContext,
    date: Option<String>,
    locale: &str,
    console: &CliConsole,
) -> Result<()> {
    let report_date = match date {
        Some(date) => {
            if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
                bail!("Invalid date '{}' (expected YYYY-MM-DD)", date);
            }
            date
        }
        None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let insight = ctx.analysis().run_manual(&report_date, locale).await?;

    console.print_header(&format!("Daily analysis {}", report_date));
    println!("{}", insight.summary);
    if !insight.anomalies.is_empty() {
        println!("\n{}", "Anomalies".bold());
        for anomaly in &insight.anomalies {
            println!("  • {}", anomaly);
        }
    }
    if !insight.recommendations.is_empty() {
        println!("\n{}", "Recommendations".bold());
        for recommendation in &insight.recommendations {
            println!("  • {}", recommendation);
        }
    }
    Ok(())
}

/// Filter for `analysis history`: days clamped to 1..=365
pub fn history_filter(
    limit: u32,
    source: Option<String>,
    status: Option<String>,
    days: u32,
    now_ms: i64,
) -> AnalysisFilter {
    let days = days.clamp(1, 365);
    let mut filter = AnalysisFilter::new(limit).since(now_ms - i64::from(days) * DAY_MS);
    filter.source = source;
    filter.status = status;
    filter
}

pub async fn history(
    ctx: &AppContext,
    filter: AnalysisFilter,
    console: &CliConsole,
) -> Result<()> {
    let items = ctx.store.list_analysis_reports(&filter).await?;
    console.print_header("Analysis history");
    print!("{}", render_history(&items));
    Ok(())
}

pub async fn trend(
    ctx: &AppContext,
    weeks: u32,
    source: Option<&str>,
    status: Option<&str>,
    console: &CliConsole,
) -> Result<()> {
    let items = ctx
        .store
        .weekly_analysis_trend(weeks, source, status)
        .await?;
    console.print_header("Weekly analysis trend");
    print!("{}", render_trend(&items));
    Ok(())
}

fn render_history(items: &[AnalysisHistoryRecord]) -> String {
    if items.is_empty() {
        return "No analysis runs found.\n".to_string();
    }

    let mut out = format!(
        "{:<24} {:<12} {:<8} {:<10} {:<8} {:>9} {:>5}\n",
        "Run", "Date", "Locale", "Source", "Status", "Anomalies", "Recs"
    );
    out.push_str(&format!("{:-<82}\n", ""));
    for item in items {
        out.push_str(&format!(
            "{:<24} {:<12} {:<8} {:<10} {} {:>9} {:>5}\n",
            format_ts(Some(item.run_ts)),
            item.report_date,
            item.locale,
            item.source,
            status_label(&format!("{:<8}", item.status)),
            item.anomalies.len(),
            item.recommendations.len()
        ));
        if let Some(error) = &item.error_message {
            out.push_str(&format!("  {} {}\n", "error:".red(), error));
        }
    }
    out.push_str(&format!("\nTotal: {} runs\n", items.len()));
    out
}

fn render_trend(items: &[WeeklyTrendRecord]) -> String {
    if items.is_empty() {
        return "No analysis runs in this period.\n".to_string();
    }

    let mut out = format!(
        "{:<12} {:>6} {:>8} {:>7} {:>7} {:>10} {:>10} {:>6}\n",
        "Week", "Runs", "Success", "Failed", "Manual", "Scheduler", "Anomalies", "Recs"
    );
    out.push_str(&format!("{:-<72}\n", ""));
    for item in items {
        out.push_str(&format!(
            "{:<12} {:>6} {:>8} {:>7} {:>7} {:>10} {:>10} {:>6}\n",
            item.week_start,
            item.total_runs,
            item.success_runs,
            item.failed_runs,
            item.manual_runs,
            item.scheduler_runs,
            item.anomalies_count,
            item.recommendations_count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_filter_clamps_days() {
        let now = 400 * DAY_MS;
        let filter = history_filter(30, None, None, 0, now);
        assert_eq!(filter.since_ts, Some(now - DAY_MS));

        let filter = history_filter(30, Some("manual".to_string()), None, 1000, now);
        assert_eq!(filter.since_ts, Some(now - 365 * DAY_MS));
        assert_eq!(filter.source.as_deref(), Some("manual"));
    }

    #[test]
    fn test_render_trend() {
        let rendered = render_trend(&[WeeklyTrendRecord {
            week_start: "2026-02-23".to_string(),
            total_runs: 3,
            success_runs: 2,
            failed_runs: 1,
            ..Default::default()
        }]);
        assert!(rendered.contains("2026-02-23"));
        assert!(rendered.lines().count() == 3);
        assert!(render_trend(&[]).contains("No analysis runs"));
    }

    #[test]
    fn test_render_history_shows_errors() {
        let rendered = render_history(&[AnalysisHistoryRecord {
            run_ts: 0,
            report_date: "2026-02-27".to_string(),
            locale: "en-US".to_string(),
            source: "manual".to_string(),
            status: "FAILED".to_string(),
            summary: String::new(),
            anomalies: Vec::new(),
            recommendations: Vec::new(),
            error_message: Some("upstream timeout".to_string()),
        }]);
        assert!(rendered.contains("upstream timeout"));
        assert!(rendered.contains("Total: 1 runs"));
    }
}
