//! Replay pipeline integration test
//!
//! Pushes history into a persisted store, reopens it, replays the window and
//! checks the report, baselines and regression detection end to end.

use glucopilot::glucopilot_core::config::ReplayDefaults;
use glucopilot::glucopilot_eval::{
    BaselineRecorder, DayType, RegressionDetector, ReplayRequest, ReportFormat, generate_report,
};
use glucopilot::{
    CopilotError, CopilotStore, GlucoseReading, LocalStore, TherapyEvent, build_replay_report,
};
use tempfile::TempDir;

/// 2024-01-01 00:00 UTC, a Monday
const MONDAY: i64 = 1_704_067_200_000;
const FIVE_MINUTES: i64 = 5 * 60 * 1000;

fn flat_history(count: i64, value: f64) -> Vec<GlucoseReading> {
    (0..count)
        .map(|i| GlucoseReading::new(MONDAY + i * FIVE_MINUTES, value, "cgm"))
        .collect()
}

async fn store_with_history(temp: &TempDir) -> LocalStore {
    let path = temp.path().join("store.json");
    {
        let store = LocalStore::open(&path).await.unwrap();
        store
            .push_sync(
                flat_history(100, 6.0),
                vec![TherapyEvent::new("carbs-1", MONDAY + 60 * 60 * 1000, "carbs")],
            )
            .await
            .unwrap();
    }
    LocalStore::open(&path).await.unwrap()
}

#[tokio::test]
async fn test_replay_over_persisted_history() {
    let temp = TempDir::new().unwrap();
    let store = store_with_history(&temp).await;
    assert_eq!(store.counts().await.unwrap(), (100, 1));

    let until = MONDAY + 99 * FIVE_MINUTES;
    let window = ReplayRequest::new(Some(MONDAY), Some(until), None)
        .resolve(until, &ReplayDefaults::default())
        .unwrap();
    assert_eq!(window.step_minutes, 5);

    let glucose = store
        .list_glucose(Some(window.since), Some(window.until))
        .await
        .unwrap();
    let therapy = store
        .list_therapy_events(Some(window.since), Some(window.until))
        .await
        .unwrap();
    let report = build_replay_report(
        &glucose,
        &therapy,
        window.since,
        window.until,
        window.step_minutes,
    );

    assert_eq!(report.points, 100);

    let horizons: Vec<u32> = report.forecast_stats.iter().map(|s| s.horizon).collect();
    assert_eq!(horizons, vec![5, 60]);
    assert_eq!(report.forecast_for(5).unwrap().sample_count, 76);
    assert_eq!(report.forecast_for(60).unwrap().sample_count, 67);
    assert!(report.forecast_stats.iter().all(|s| s.mae.abs() < 1e-9));

    assert_eq!(report.rule_stats.len(), 1);
    let rule = &report.rule_stats[0];
    assert_eq!(rule.rule_id, "PostHypoReboundGuard.v1");
    assert_eq!((rule.triggered, rule.blocked, rule.no_match), (0, 0, 76));

    let day_types: Vec<DayType> = report.day_type_stats.iter().map(|d| d.day_type).collect();
    assert_eq!(day_types, vec![DayType::Weekday, DayType::Weekend]);
    assert_eq!(report.day_type_stats[0].forecast_stats.len(), 2);
    assert!(report.day_type_stats[1].forecast_stats.is_empty());
    let hourly_samples: usize = report.hourly_stats.iter().map(|h| h.sample_count).sum();
    assert_eq!(hourly_samples, 76);
    assert!(report.hourly_stats.iter().all(|h| (2..=8).contains(&h.hour)));
    assert_eq!(report.drift_stats.len(), 2);
}

#[tokio::test]
async fn test_replay_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let store = store_with_history(&temp).await;
    let glucose = store.list_glucose(None, None).await.unwrap();
    let until = MONDAY + 99 * FIVE_MINUTES;

    let first = build_replay_report(&glucose, &[], MONDAY, until, 5);
    let second = build_replay_report(&glucose, &[], MONDAY, until, 5);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_short_window_yields_empty_report() {
    let temp = TempDir::new().unwrap();
    let store = store_with_history(&temp).await;
    let glucose = store.list_glucose(None, None).await.unwrap();

    let until = MONDAY + 20 * FIVE_MINUTES;
    let report = build_replay_report(&glucose, &[], MONDAY, until, 5);

    assert_eq!(report.points, 21);
    assert!(report.forecast_stats.is_empty());
    assert!(report.day_type_stats.is_empty());
    assert!(report.hourly_stats.is_empty());
    assert!(report.drift_stats.is_empty());
    assert_eq!(report.rule_stats.len(), 1);
    assert_eq!(report.rule_stats[0].total(), 0);
}

#[test]
fn test_inverted_window_is_rejected() {
    let err = ReplayRequest::new(Some(MONDAY), Some(MONDAY), None)
        .resolve(MONDAY, &ReplayDefaults::default())
        .unwrap_err();
    assert!(matches!(err, CopilotError::InvalidRange { .. }));
}

#[tokio::test]
async fn test_baseline_round_trip_has_no_regressions() {
    let temp = TempDir::new().unwrap();
    let store = store_with_history(&temp).await;
    let glucose = store.list_glucose(None, None).await.unwrap();
    let report = build_replay_report(&glucose, &[], MONDAY, MONDAY + 99 * FIVE_MINUTES, 5);

    let recorder = BaselineRecorder::new(temp.path().join("baselines"));
    let saved = recorder.record("flat", &report).await.unwrap();
    let loaded = recorder.find("flat").await.unwrap();
    assert_eq!(loaded.id, saved.id);
    assert_eq!(loaded.report, report);

    let regressions = RegressionDetector::with_defaults().detect(&loaded.report, &report);
    assert!(regressions.is_empty());

    let markdown = generate_report(&report, ReportFormat::Markdown).unwrap();
    assert!(markdown.contains("PostHypoReboundGuard.v1"));
}

#[tokio::test]
async fn test_seeded_store_replays() {
    let temp = TempDir::new().unwrap();
    let store = LocalStore::open(temp.path().join("store.json")).await.unwrap();
    store.ensure_seed_data().await.unwrap();

    let glucose = store.list_glucose(None, None).await.unwrap();
    assert_eq!(glucose.len(), 72);

    let since = glucose[0].ts;
    let until = glucose[glucose.len() - 1].ts;
    let report = build_replay_report(&glucose, &[], since, until, 5);

    assert_eq!(report.points, 72);
    assert!(report.has_forecast_samples());
    assert_eq!(report.rule_stats[0].no_match, 48);
}
