//! Store abstraction and implementations
//!
//! Provides trait-based storage for readings, therapy events, actions, the
//! model registry, job bookkeeping and analysis history, with a local
//! JSON-snapshot implementation.

mod local;
mod state;

pub use local::LocalStore;

use crate::records::{
    ActionRecord, AnalysisFilter, AnalysisHistoryRecord, JobStatusSnapshot, ModelInfo,
    NewAnalysisReport, PullResult, PushResult, STATUS_FAILED, STATUS_SUCCESS, SOURCE_MANUAL,
    SOURCE_SCHEDULER, TempTargetRequest, WeeklyTrendRecord,
};
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Utc};
use glucopilot_core::{CopilotError, DAY_MS, GlucoseReading, TherapyEvent};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid store data: {0}")]
    InvalidData(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for CopilotError {
    fn from(err: StoreError) -> Self {
        CopilotError::storage(err.to_string())
    }
}

/// Current time in unix milliseconds
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Storage trait for different backends
#[async_trait]
pub trait CopilotStore: Send + Sync {
    /// Insert demo readings, an event and the model registry once
    async fn ensure_seed_data(&self) -> StoreResult<()>;

    /// Readings and events with `ts >= since`, ascending
    async fn pull_since(&self, since: i64) -> StoreResult<PullResult>;

    /// Upsert a client batch; duplicates within the batch keep the last entry
    async fn push_sync(
        &self,
        glucose: Vec<GlucoseReading>,
        therapy_events: Vec<TherapyEvent>,
    ) -> StoreResult<PushResult>;

    /// Readings within optional inclusive bounds, ascending
    async fn list_glucose(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> StoreResult<Vec<GlucoseReading>>;

    /// Therapy events within optional inclusive bounds, ascending
    async fn list_therapy_events(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> StoreResult<Vec<TherapyEvent>>;

    /// Accept a temp target once per idempotency key
    async fn upsert_temp_target_action(
        &self,
        request: &TempTargetRequest,
    ) -> StoreResult<ActionRecord>;

    /// Look up an action by id
    async fn get_action(&self, id: &str) -> StoreResult<Option<ActionRecord>>;

    /// Registry entries by horizon, most recently updated first
    async fn list_active_models(&self) -> StoreResult<Vec<ModelInfo>>;

    /// Mark every registry entry as retrained now; returns how many
    async fn touch_weekly_retrain(&self) -> StoreResult<usize>;

    /// Number of stored readings and therapy events
    async fn counts(&self) -> StoreResult<(usize, usize)>;

    /// Record the outcome of a job run
    async fn record_job_status(
        &self,
        job_id: &str,
        status: &str,
        message: &str,
    ) -> StoreResult<()>;

    /// Last known state of a job
    async fn get_job_status(&self, job_id: &str) -> StoreResult<JobStatusSnapshot>;

    /// Store a daily analysis run stamped with the current time
    async fn add_analysis_report(
        &self,
        report: NewAnalysisReport,
    ) -> StoreResult<AnalysisHistoryRecord>;

    /// Analysis history matching the filter, newest first
    async fn list_analysis_reports(
        &self,
        filter: &AnalysisFilter,
    ) -> StoreResult<Vec<AnalysisHistoryRecord>>;

    /// Look up an action, failing when it does not exist
    async fn require_action(&self, id: &str) -> StoreResult<ActionRecord> {
        self.get_action(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("action {}", id)))
    }

    /// Analysis runs of the last `weeks` weeks rolled up per week, ascending
    async fn weekly_analysis_trend(
        &self,
        weeks: u32,
        source: Option<&str>,
        status: Option<&str>,
    ) -> StoreResult<Vec<WeeklyTrendRecord>> {
        let weeks = weeks.clamp(1, 52);
        let since_ts = now_ms() - i64::from(weeks) * 7 * DAY_MS;
        let mut filter = AnalysisFilter::new(weeks * 32).since(since_ts);
        filter.source = source.map(str::to_string);
        filter.status = status.map(str::to_string);

        let reports = self.list_analysis_reports(&filter).await?;
        Ok(weekly_trend(&reports, weeks as usize))
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

/// Roll reports up by week; keeps the latest `weeks` buckets, ascending
pub fn weekly_trend(reports: &[AnalysisHistoryRecord], weeks: usize) -> Vec<WeeklyTrendRecord> {
    let mut buckets: BTreeMap<NaiveDate, WeeklyTrendRecord> = BTreeMap::new();

    for report in reports {
        let Ok(day) = NaiveDate::parse_from_str(&report.report_date, "%Y-%m-%d") else {
            warn!(
                "Skipping analysis report with unparseable date '{}'",
                report.report_date
            );
            continue;
        };

        let start = week_start(day);
        let bucket = buckets.entry(start).or_insert_with(|| WeeklyTrendRecord {
            week_start: start.format("%Y-%m-%d").to_string(),
            ..WeeklyTrendRecord::default()
        });

        bucket.total_runs += 1;
        if report.status == STATUS_SUCCESS {
            bucket.success_runs += 1;
        }
        if report.status == STATUS_FAILED {
            bucket.failed_runs += 1;
        }
        if report.source == SOURCE_MANUAL {
            bucket.manual_runs += 1;
        }
        if report.source == SOURCE_SCHEDULER {
            bucket.scheduler_runs += 1;
        }
        bucket.anomalies_count += report.anomalies.len() as u32;
        bucket.recommendations_count += report.recommendations.len() as u32;
    }

    let skip = buckets.len().saturating_sub(weeks);
    buckets.into_values().skip(skip).collect()
}
