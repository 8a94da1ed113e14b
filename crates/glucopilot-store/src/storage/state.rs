//! In-memory store state
//!
//! Every mutation is a plain method here; [`super::LocalStore`] wraps the
//! state in a lock and persists it after each change.

use std::collections::BTreeMap;

use glucopilot_core::{GlucoseReading, MINUTE_MS, TherapyEvent};
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult};
use crate::records::{
    ActionRecord, AnalysisFilter, AnalysisHistoryRecord, JobStatusSnapshot, ModelInfo,
    NewAnalysisReport, PullResult, PushResult, STATUS_SUCCESS, TempTargetRequest, clip,
};

const SEEDED_KEY: &str = "seeded";
const SEED_READINGS: i64 = 72;
const SEED_SOURCE: &str = "seed";
const JOB_MESSAGE_MAX_CHARS: usize = 512;
const SUMMARY_MAX_CHARS: usize = 4000;
const ERROR_MAX_CHARS: usize = 512;

/// Everything the store holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StoreState {
    /// Readings ordered by `(ts, source)`
    glucose: Vec<GlucoseReading>,

    /// Therapy events by id
    therapy_events: BTreeMap<String, TherapyEvent>,

    /// Actions by id
    actions: BTreeMap<String, ActionRecord>,

    /// Model registry
    models: Vec<ModelInfo>,

    /// Flags and job bookkeeping
    kv: BTreeMap<String, String>,

    /// Analysis runs in insertion order
    analysis_reports: Vec<AnalysisHistoryRecord>,
}

fn within(ts: i64, since: Option<i64>, until: Option<i64>) -> bool {
    since.is_none_or(|s| ts >= s) && until.is_none_or(|u| ts <= u)
}

fn job_key(job_id: &str, field: &str) -> String {
    format!("job.{}.{}", job_id, field)
}

/// Render a target the way clients expect it (`4.4`, `5.0`)
fn format_mmol(value: f64) -> String {
    format!("{:?}", value)
}

impl StoreState {
    /// Seed demo data once; returns whether anything was inserted
    pub(crate) fn seed(&mut self, now: i64) -> bool {
        if self.kv.get(SEEDED_KEY).map(String::as_str) == Some("1") {
            return false;
        }

        for i in 0..SEED_READINGS {
            let value = 5.8 + ((i % 6) - 3) as f64 * 0.1;
            let ts = now - (SEED_READINGS - 1 - i) * 5 * MINUTE_MS;
            self.upsert_glucose(GlucoseReading::new(ts, value, SEED_SOURCE));
        }

        self.merge_event(
            TherapyEvent::new("seed-temp-target", now - 30 * MINUTE_MS, "temp_target")
                .with_payload("targetBottom", "5.5")
                .with_payload("duration", "60"),
        );

        self.merge_model(5, "cloud-hf-v1", 0.42, now);
        self.merge_model(60, "cloud-ensemble-v1", 1.08, now);

        self.kv.insert(SEEDED_KEY.to_string(), "1".to_string());
        true
    }

    fn upsert_glucose(&mut self, reading: GlucoseReading) {
        let position = self.glucose.binary_search_by(|r| {
            (r.ts, r.source.as_str()).cmp(&(reading.ts, reading.source.as_str()))
        });
        match position {
            Ok(index) => {
                let existing = &mut self.glucose[index];
                existing.value_mmol = reading.value_mmol;
                existing.quality = reading.quality;
            }
            Err(index) => self.glucose.insert(index, reading),
        }
    }

    fn merge_event(&mut self, event: TherapyEvent) {
        self.therapy_events.insert(event.id.clone(), event);
    }

    fn merge_model(&mut self, horizon: u32, model_version: &str, mae: f64, now: i64) {
        match self
            .models
            .iter_mut()
            .find(|m| m.horizon == horizon && m.model_version == model_version)
        {
            Some(model) => {
                model.mae = mae;
                model.updated_at = now;
            }
            None => self.models.push(ModelInfo {
                horizon,
                model_version: model_version.to_string(),
                mae,
                updated_at: now,
            }),
        }
    }

    /// Therapy events sorted by timestamp
    fn events_by_time(&self) -> Vec<&TherapyEvent> {
        let mut events: Vec<&TherapyEvent> = self.therapy_events.values().collect();
        events.sort_by_key(|e| e.ts);
        events
    }

    pub(crate) fn pull_since(&self, since: i64) -> PullResult {
        let glucose = self.list_glucose(Some(since), None);
        let therapy_events = self.list_therapy_events(Some(since), None);

        let next_since = glucose
            .last()
            .map(|r| r.ts)
            .into_iter()
            .chain(therapy_events.last().map(|e| e.ts))
            .fold(since, i64::max);

        PullResult {
            glucose,
            therapy_events,
            next_since,
        }
    }

    pub(crate) fn push_sync(
        &mut self,
        glucose: Vec<GlucoseReading>,
        therapy_events: Vec<TherapyEvent>,
    ) -> PushResult {
        let mut glucose_batch: BTreeMap<(i64, String), GlucoseReading> = BTreeMap::new();
        for reading in glucose {
            glucose_batch.insert(reading.key(), reading);
        }
        let mut event_batch: BTreeMap<String, TherapyEvent> = BTreeMap::new();
        for event in therapy_events {
            event_batch.insert(event.id.clone(), event);
        }

        let next_since = glucose_batch
            .values()
            .map(|r| r.ts)
            .chain(event_batch.values().map(|e| e.ts))
            .fold(0, i64::max);

        let result = PushResult {
            accepted_glucose: glucose_batch.len(),
            accepted_therapy_events: event_batch.len(),
            next_since,
        };

        for reading in glucose_batch.into_values() {
            self.upsert_glucose(reading);
        }
        for event in event_batch.into_values() {
            self.merge_event(event);
        }

        result
    }

    pub(crate) fn list_glucose(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> Vec<GlucoseReading> {
        self.glucose
            .iter()
            .filter(|r| within(r.ts, since, until))
            .cloned()
            .collect()
    }

    pub(crate) fn list_therapy_events(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> Vec<TherapyEvent> {
        self.events_by_time()
            .into_iter()
            .filter(|e| within(e.ts, since, until))
            .cloned()
            .collect()
    }

    /// Returns the action and whether it was newly created
    ///
    /// An id already taken under another idempotency key is a conflict.
    pub(crate) fn upsert_temp_target_action(
        &mut self,
        request: &TempTargetRequest,
        now: i64,
    ) -> StoreResult<(ActionRecord, bool)> {
        if let Some(existing) = self
            .actions
            .values()
            .find(|a| a.idempotency_key == request.idempotency_key)
        {
            return Ok((existing.clone(), false));
        }

        if let Some(taken) = self.actions.get(&request.id) {
            return Err(StoreError::Conflict(format!(
                "action {} already exists with idempotency key {}",
                taken.id, taken.idempotency_key
            )));
        }

        let target = format_mmol(request.target_mmol);
        let action = ActionRecord {
            id: request.id.clone(),
            status: "accepted".to_string(),
            message: format!(
                "temp target {} mmol/L for {}m",
                target, request.duration_minutes
            ),
            idempotency_key: request.idempotency_key.clone(),
            created_ts: now,
        };
        self.actions.insert(action.id.clone(), action.clone());

        self.merge_event(
            TherapyEvent::new(format!("action-{}", request.id), now, "temp_target")
                .with_payload("targetBottom", target.clone())
                .with_payload("targetTop", target)
                .with_payload("duration", request.duration_minutes.to_string())
                .with_payload("reason", "copilot_auto"),
        );

        Ok((action, true))
    }

    pub(crate) fn get_action(&self, id: &str) -> Option<ActionRecord> {
        self.actions.get(id).cloned()
    }

    pub(crate) fn list_active_models(&self) -> Vec<ModelInfo> {
        let mut models = self.models.clone();
        models.sort_by(|a, b| {
            a.horizon
                .cmp(&b.horizon)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        models
    }

    pub(crate) fn touch_weekly_retrain(&mut self, now: i64) -> usize {
        for model in &mut self.models {
            model.updated_at = now;
        }
        self.models.len()
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.glucose.len(), self.therapy_events.len())
    }

    pub(crate) fn record_job_status(
        &mut self,
        job_id: &str,
        status: &str,
        message: &str,
        now: i64,
    ) {
        let now_text = now.to_string();
        self.kv.insert(job_key(job_id, "last_run_ts"), now_text.clone());
        self.kv.insert(job_key(job_id, "last_status"), status.to_string());
        self.kv.insert(
            job_key(job_id, "last_message"),
            clip(message, JOB_MESSAGE_MAX_CHARS),
        );
        if status.eq_ignore_ascii_case(STATUS_SUCCESS) {
            self.kv.insert(job_key(job_id, "last_success_ts"), now_text);
        }
    }

    pub(crate) fn get_job_status(&self, job_id: &str) -> JobStatusSnapshot {
        let text = |field: &str| self.kv.get(&job_key(job_id, field)).cloned();
        let int = |field: &str| text(field).and_then(|v| v.parse::<i64>().ok());

        JobStatusSnapshot {
            job_id: job_id.to_string(),
            last_run_ts: int("last_run_ts"),
            last_success_ts: int("last_success_ts"),
            last_status: text("last_status"),
            last_message: text("last_message"),
        }
    }

    pub(crate) fn add_analysis_report(
        &mut self,
        report: NewAnalysisReport,
        now: i64,
    ) -> AnalysisHistoryRecord {
        let record = AnalysisHistoryRecord {
            run_ts: now,
            report_date: report.report_date,
            locale: report.locale,
            source: report.source,
            status: report.status,
            summary: clip(&report.summary, SUMMARY_MAX_CHARS),
            anomalies: report.anomalies,
            recommendations: report.recommendations,
            error_message: report
                .error_message
                .map(|e| clip(&e, ERROR_MAX_CHARS))
                .filter(|e| !e.is_empty()),
        };
        self.analysis_reports.push(record.clone());
        record
    }

    pub(crate) fn list_analysis_reports(
        &self,
        filter: &AnalysisFilter,
    ) -> Vec<AnalysisHistoryRecord> {
        // Newest insertion first among equal run_ts
        let mut matching: Vec<&AnalysisHistoryRecord> = self
            .analysis_reports
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .collect();
        matching.sort_by(|a, b| b.run_ts.cmp(&a.run_ts));
        matching
            .into_iter()
            .take(filter.effective_limit())
            .cloned()
            .collect()
    }
}
