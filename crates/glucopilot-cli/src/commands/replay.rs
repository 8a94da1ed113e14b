//! Replay and baseline comparison commands

use anyhow::{Context, Result};
use chrono::Utc;
use glucopilot_eval::replay::Regression;
use glucopilot_eval::{
    Baseline, BaselineRecorder, RegressionDetector, ReplayReport, ReplayRequest, ReportFormat,
    build_replay_report, generate_report,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::console::CliConsole;
use crate::context::AppContext;

/// Options for `glucopilot replay`
pub struct ReplayOptions {
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub step_minutes: Option<u32>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub save_baseline: Option<String>,
    pub baseline_dir: Option<PathBuf>,
}

/// Replay stored history and render the report
pub async fn run(ctx: &AppContext, options: ReplayOptions, console: &CliConsole) -> Result<()> {
    let format = ReportFormat::from_str(&options.format).map_err(anyhow::Error::msg)?;

    let window = ReplayRequest::new(options.since, options.until, options.step_minutes)
        .resolve(Utc::now().timestamp_millis(), &ctx.config.replay)?;

    let glucose = ctx
        .store
        .list_glucose(Some(window.since), Some(window.until))
        .await?;
    let therapy = ctx
        .store
        .list_therapy_events(Some(window.since), Some(window.until))
        .await?;

    info!(
        since = window.since,
        until = window.until,
        step_minutes = window.step_minutes,
        readings = glucose.len(),
        "Running replay"
    );

    let report = build_replay_report(
        &glucose,
        &therapy,
        window.since,
        window.until,
        window.step_minutes,
    );
    if !report.has_forecast_samples() {
        warn!(
            points = report.points,
            "Not enough readings in the window to score forecasts"
        );
    }

    let rendered = generate_report(&report, format)?;
    match &options.output {
        Some(path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            console.success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    if let Some(name) = &options.save_baseline {
        let recorder = BaselineRecorder::new(ctx.baseline_dir(options.baseline_dir.as_deref()));
        let baseline = recorder.record(name, &report).await?;
        console.success(&format!(
            "Saved baseline '{}' ({}) in {}",
            baseline.name,
            baseline.id,
            recorder.output_dir().display()
        ));
    }

    Ok(())
}

/// Load a report from a baseline or plain report file
async fn load_report_file(path: &Path) -> Result<ReplayReport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if let Ok(baseline) = serde_json::from_str::<Baseline>(&content) {
        return Ok(baseline.report);
    }
    serde_json::from_str(&content)
        .with_context(|| format!("{} is neither a baseline nor a replay report", path.display()))
}

/// Resolve `--baseline`: a file path, else a saved baseline id or name
async fn load_baseline(reference: &str, baseline_dir: PathBuf) -> Result<ReplayReport> {
    let path = Path::new(reference);
    if path.is_file() {
        return load_report_file(path).await;
    }

    let baseline = BaselineRecorder::new(baseline_dir).find(reference).await?;
    Ok(baseline.report)
}

/// Compare a current report against a baseline
pub async fn compare(
    ctx: &AppContext,
    baseline: &str,
    current: &Path,
    baseline_dir: Option<&Path>,
) -> Result<()> {
    let baseline_report = load_baseline(baseline, ctx.baseline_dir(baseline_dir)).await?;
    let current_report = load_report_file(current).await?;

    let detector = RegressionDetector::with_defaults();
    let regressions = detector.detect(&baseline_report, &current_report);

    print!(
        "{}",
        render_comparison(baseline, current, &baseline_report, &current_report)
    );
    println!();
    println!("{}", RegressionDetector::summarize(&regressions));

    if has_severe(&regressions) {
        warn!("Severe regressions detected");
    }

    Ok(())
}

fn has_severe(regressions: &[Regression]) -> bool {
    regressions.iter().any(|r| r.severity >= 0.5)
}

/// Side-by-side metric table
fn render_comparison(
    baseline_label: &str,
    current: &Path,
    baseline: &ReplayReport,
    current_report: &ReplayReport,
) -> String {
    let mut out = format!(
        "Comparison: {} vs {}\n\n",
        baseline_label,
        current.display()
    );
    out.push_str(&format!(
        "{:<20} {:>15} {:>15} {:>15}\n",
        "Metric", "Baseline", "Current", "Change"
    ));
    out.push_str(&format!("{:-<65}\n", ""));

    out.push_str(&format!(
        "{:<20} {:>15} {:>15} {:>+15}\n",
        "Points",
        baseline.points,
        current_report.points,
        current_report.points as i64 - baseline.points as i64
    ));

    for stats in &current_report.forecast_stats {
        let Some(base) = baseline.forecast_for(stats.horizon) else {
            continue;
        };
        out.push_str(&format!(
            "{:<20} {:>15.3} {:>15.3} {:>+15.3}\n",
            format!("MAE h{}", stats.horizon),
            base.mae,
            stats.mae,
            stats.mae - base.mae
        ));
        out.push_str(&format!(
            "{:<20} {:>14.2}% {:>14.2}% {:>+14.2}%\n",
            format!("MARD h{}", stats.horizon),
            base.mard_pct,
            stats.mard_pct,
            stats.mard_pct - base.mard_pct
        ));
    }

    for rule in &current_report.rule_stats {
        let Some(base) = baseline.rule(&rule.rule_id) else {
            continue;
        };
        out.push_str(&format!(
            "{:<20} {:>14.1}% {:>14.1}% {:>+14.1}%\n",
            "Trigger rate",
            base.trigger_rate() * 100.0,
            rule.trigger_rate() * 100.0,
            (rule.trigger_rate() - base.trigger_rate()) * 100.0
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucopilot_eval::ForecastStats;
    use tempfile::TempDir;

    fn report_with_mae(mae: f64) -> ReplayReport {
        let mut report = ReplayReport::insufficient(0, 1, 40, "PostHypoReboundGuard.v1");
        report.forecast_stats = vec![ForecastStats {
            horizon: 5,
            sample_count: 10,
            mae,
            rmse: mae,
            mard_pct: 5.0,
        }];
        report
    }

    #[test]
    fn test_comparison_table_lists_shared_horizons() {
        let table = render_comparison(
            "base",
            Path::new("current.json"),
            &report_with_mae(0.4),
            &report_with_mae(0.5),
        );
        assert!(table.contains("MAE h5"));
        assert!(table.contains("MARD h5"));
        assert!(table.contains("+0.100"));
        assert!(table.contains("Trigger rate"));
    }

    #[tokio::test]
    async fn test_load_report_accepts_both_shapes() {
        let temp = TempDir::new().unwrap();
        let recorder = BaselineRecorder::new(temp.path());
        let saved = recorder.record("nightly", &report_with_mae(0.4)).await.unwrap();

        let plain = temp.path().join("plain.json");
        tokio::fs::write(&plain, serde_json::to_string(&report_with_mae(0.7)).unwrap())
            .await
            .unwrap();

        let from_plain = load_report_file(&plain).await.unwrap();
        assert_eq!(from_plain.forecast_for(5).unwrap().mae, 0.7);

        let by_name = load_baseline("nightly", temp.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(by_name.forecast_for(5).unwrap().mae, 0.4);

        let by_id = load_baseline(&saved.id, temp.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(by_id.points, 40);
    }

    #[tokio::test]
    async fn test_unknown_baseline_fails() {
        let temp = TempDir::new().unwrap();
        assert!(
            load_baseline("missing", temp.path().to_path_buf())
                .await
                .is_err()
        );
    }
}
