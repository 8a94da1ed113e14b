//! Local store
//!
//! Keeps the state in memory and, when a path is given, mirrors it to a
//! pretty-printed JSON snapshot after every mutation.

use super::state::StoreState;
use super::{CopilotStore, StoreResult, now_ms};
use crate::records::{
    ActionRecord, AnalysisFilter, AnalysisHistoryRecord, JobStatusSnapshot, ModelInfo,
    NewAnalysisReport, PullResult, PushResult, TempTargetRequest,
};
use async_trait::async_trait;
use glucopilot_core::{GlucoseReading, TherapyEvent};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Local store backed by an optional JSON snapshot
///
/// The snapshot lives at:
/// - `~/.glucopilot/store.json` (default, resolved by the configuration)
/// - Custom path if specified
pub struct LocalStore {
    /// Snapshot file, `None` for a purely in-memory store
    path: Option<PathBuf>,

    state: RwLock<StoreState>,
}

impl LocalStore {
    /// Create an empty store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Open the snapshot at `path`; a missing file yields an empty store
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let state = if fs::try_exists(&path).await? {
            let content = fs::read_to_string(&path).await?;
            let state: StoreState = serde_json::from_str(&content)?;
            debug!("Loaded store snapshot from {:?}", path);
            state
        } else {
            debug!("No store snapshot at {:?}; starting empty", path);
            StoreState::default()
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// Snapshot path, if persisted
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the snapshot
    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(path, content).await?;
        debug!("Saved store snapshot to {:?}", path);
        Ok(())
    }

    /// Apply a change under the write lock and persist it
    async fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreState) -> T + Send,
        T: Send,
    {
        let mut state = self.state.write().await;
        let result = change(&mut state);
        self.persist(&state).await?;
        Ok(result)
    }
}

#[async_trait]
impl CopilotStore for LocalStore {
    async fn ensure_seed_data(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.seed(now_ms()) {
            self.persist(&state).await?;
            info!("Seeded store with demo readings and model registry");
        }
        Ok(())
    }

    async fn pull_since(&self, since: i64) -> StoreResult<PullResult> {
        Ok(self.state.read().await.pull_since(since))
    }

    async fn push_sync(
        &self,
        glucose: Vec<GlucoseReading>,
        therapy_events: Vec<TherapyEvent>,
    ) -> StoreResult<PushResult> {
        let result = self
            .mutate(|state| state.push_sync(glucose, therapy_events))
            .await?;
        debug!(
            accepted_glucose = result.accepted_glucose,
            accepted_therapy_events = result.accepted_therapy_events,
            "Applied sync push"
        );
        Ok(result)
    }

    async fn list_glucose(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> StoreResult<Vec<GlucoseReading>> {
        Ok(self.state.read().await.list_glucose(since, until))
    }

    async fn list_therapy_events(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> StoreResult<Vec<TherapyEvent>> {
        Ok(self.state.read().await.list_therapy_events(since, until))
    }

    async fn upsert_temp_target_action(
        &self,
        request: &TempTargetRequest,
    ) -> StoreResult<ActionRecord> {
        let mut state = self.state.write().await;
        let (action, created) = state.upsert_temp_target_action(request, now_ms())?;
        if created {
            self.persist(&state).await?;
            info!("Accepted action {}: {}", action.id, action.message);
        } else {
            debug!(
                "Idempotency key {} already used by action {}",
                request.idempotency_key, action.id
            );
        }
        Ok(action)
    }

    async fn get_action(&self, id: &str) -> StoreResult<Option<ActionRecord>> {
        Ok(self.state.read().await.get_action(id))
    }

    async fn list_active_models(&self) -> StoreResult<Vec<ModelInfo>> {
        Ok(self.state.read().await.list_active_models())
    }

    async fn touch_weekly_retrain(&self) -> StoreResult<usize> {
        let now = now_ms();
        self.mutate(|state| state.touch_weekly_retrain(now)).await
    }

    async fn counts(&self) -> StoreResult<(usize, usize)> {
        Ok(self.state.read().await.counts())
    }

    async fn record_job_status(
        &self,
        job_id: &str,
        status: &str,
        message: &str,
    ) -> StoreResult<()> {
        let now = now_ms();
        self.mutate(|state| state.record_job_status(job_id, status, message, now))
            .await
    }

    async fn get_job_status(&self, job_id: &str) -> StoreResult<JobStatusSnapshot> {
        Ok(self.state.read().await.get_job_status(job_id))
    }

    async fn add_analysis_report(
        &self,
        report: NewAnalysisReport,
    ) -> StoreResult<AnalysisHistoryRecord> {
        let now = now_ms();
        self.mutate(|state| state.add_analysis_report(report, now))
            .await
    }

    async fn list_analysis_reports(
        &self,
        filter: &AnalysisFilter,
    ) -> StoreResult<Vec<AnalysisHistoryRecord>> {
        Ok(self.state.read().await.list_analysis_reports(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{SOURCE_MANUAL, STATUS_SUCCESS};
    use crate::storage::StoreError;
    use tempfile::TempDir;

    async fn create_test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("store.json"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn report(date: &str) -> NewAnalysisReport {
        NewAnalysisReport {
            report_date: date.to_string(),
            locale: "en-US".to_string(),
            source: SOURCE_MANUAL.to_string(),
            status: STATUS_SUCCESS.to_string(),
            summary: "stable".to_string(),
            anomalies: vec!["night low".to_string()],
            recommendations: Vec::new(),
            error_message: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let (store, temp) = create_test_store().await;
        store.ensure_seed_data().await.unwrap();
        store
            .record_job_status("weekly-retrain", "SUCCESS", "models_updated=2")
            .await
            .unwrap();

        let reopened = LocalStore::open(temp.path().join("store.json"))
            .await
            .unwrap();
        assert_eq!(reopened.counts().await.unwrap(), (72, 1));
        let status = reopened.get_job_status("weekly-retrain").await.unwrap();
        assert_eq!(status.last_message.as_deref(), Some("models_updated=2"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (store, _temp) = create_test_store().await;
        store.ensure_seed_data().await.unwrap();
        store.ensure_seed_data().await.unwrap();

        assert_eq!(store.counts().await.unwrap(), (72, 1));
        assert_eq!(store.list_active_models().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("nested/store.json"))
            .await
            .unwrap();
        assert_eq!(store.counts().await.unwrap(), (0, 0));
        assert!(!temp_dir.path().join("nested").exists());

        store
            .push_sync(vec![GlucoseReading::new(1, 5.0, "cgm")], Vec::new())
            .await
            .unwrap();
        assert!(temp_dir.path().join("nested/store.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = LocalStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_action_lookup() {
        let store = LocalStore::in_memory();
        let request = TempTargetRequest {
            id: "a1".to_string(),
            target_mmol: 4.4,
            duration_minutes: 60,
            idempotency_key: "k1".to_string(),
        };
        store.upsert_temp_target_action(&request).await.unwrap();

        assert!(store.get_action("a1").await.unwrap().is_some());
        assert!(store.get_action("zz").await.unwrap().is_none());
        assert!(matches!(
            store.require_action("zz").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.counts().await.unwrap(), (0, 1));
    }

    #[tokio::test]
    async fn test_weekly_trend_from_store() {
        let store = LocalStore::in_memory();
        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        store.add_analysis_report(report(&today)).await.unwrap();
        store.add_analysis_report(report(&today)).await.unwrap();

        let trend = store.weekly_analysis_trend(8, None, None).await.unwrap();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].total_runs, 2);
        assert_eq!(trend[0].manual_runs, 2);
        assert_eq!(trend[0].anomalies_count, 2);

        let scheduled = store
            .weekly_analysis_trend(8, Some("scheduler"), None)
            .await
            .unwrap();
        assert!(scheduled.is_empty());
    }
}
