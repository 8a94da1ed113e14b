//! Stored record types
//!
//! Defines what the store hands back besides raw readings and events:
//! - Sync results for pull/push exchanges
//! - Temp-target actions and their idempotency keys
//! - Model registry entries and job status snapshots
//! - Daily analysis history and its weekly roll-up

use glucopilot_core::{GlucoseReading, TherapyEvent};
use serde::{Deserialize, Serialize};

/// Job status value for a successful run
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Job status value for a failed run
pub const STATUS_FAILED: &str = "FAILED";

/// Report source for runs started by a user
pub const SOURCE_MANUAL: &str = "manual";

/// Report source for runs started by the scheduler
pub const SOURCE_SCHEDULER: &str = "scheduler";

/// Readings and events changed since a cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResult {
    pub glucose: Vec<GlucoseReading>,
    pub therapy_events: Vec<TherapyEvent>,
    pub next_since: i64,
}

/// Batch uploaded by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBatch {
    #[serde(default)]
    pub glucose: Vec<GlucoseReading>,
    #[serde(default)]
    pub therapy_events: Vec<TherapyEvent>,
}

/// Outcome of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResult {
    pub accepted_glucose: usize,
    pub accepted_therapy_events: usize,
    pub next_since: i64,
}

/// Request to set a temporary glucose target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempTargetRequest {
    pub id: String,
    pub target_mmol: f64,
    pub duration_minutes: u32,
    pub idempotency_key: String,
}

/// An accepted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: String,
    pub status: String,
    pub message: String,
    pub idempotency_key: String,
    pub created_ts: i64,
}

/// Model registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub horizon: u32,
    pub model_version: String,
    pub mae: f64,
    pub updated_at: i64,
}

/// Last known state of a tracked job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusSnapshot {
    pub job_id: String,
    pub last_run_ts: Option<i64>,
    pub last_success_ts: Option<i64>,
    pub last_status: Option<String>,
    pub last_message: Option<String>,
}

/// A daily analysis outcome to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysisReport {
    pub report_date: String,
    pub locale: String,
    pub source: String,
    pub status: String,
    pub summary: String,
    pub anomalies: Vec<String>,
    pub recommendations: Vec<String>,
    pub error_message: Option<String>,
}

/// A stored daily analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistoryRecord {
    pub run_ts: i64,
    #[serde(rename = "date")]
    pub report_date: String,
    pub locale: String,
    pub source: String,
    pub status: String,
    pub summary: String,
    pub anomalies: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Filter criteria for analysis history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFilter {
    /// Maximum number of results, clamped to 1..=365
    pub limit: u32,

    /// Only reports from this source
    pub source: Option<String>,

    /// Only reports with this status
    pub status: Option<String>,

    /// Only reports run at or after this timestamp
    pub since_ts: Option<i64>,
}

impl Default for AnalysisFilter {
    fn default() -> Self {
        Self {
            limit: 30,
            source: None,
            status: None,
            since_ts: None,
        }
    }
}

impl AnalysisFilter {
    /// Create a filter with a result limit
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Filter by source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Filter by status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Filter by minimum run timestamp
    pub fn since(mut self, since_ts: i64) -> Self {
        self.since_ts = Some(since_ts);
        self
    }

    /// Limit after clamping
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, 365) as usize
    }

    /// Check if a report matches this filter
    pub fn matches(&self, record: &AnalysisHistoryRecord) -> bool {
        if let Some(source) = self.source.as_deref().filter(|s| !s.is_empty()) {
            if record.source != source {
                return false;
            }
        }

        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            if record.status != status {
                return false;
            }
        }

        if let Some(since_ts) = self.since_ts {
            if record.run_ts < since_ts {
                return false;
            }
        }

        true
    }
}

/// Analysis runs rolled up by ISO week (Monday start)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrendRecord {
    pub week_start: String,
    pub total_runs: u32,
    pub success_runs: u32,
    pub failed_runs: u32,
    pub manual_runs: u32,
    pub scheduler_runs: u32,
    pub anomalies_count: u32,
    pub recommendations_count: u32,
}

/// Trim and cut text to at most `max_chars` characters
pub(crate) fn clip(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
