//! Daily analysis service
//!
//! Runs the insight provider over the current store contents and keeps a
//! history entry for every attempt, successful or not.

use glucopilot_core::{CopilotResult, DailyInsight, InsightProvider};
use glucopilot_store::{
    CopilotStore, NewAnalysisReport, SOURCE_MANUAL, SOURCE_SCHEDULER, STATUS_FAILED,
    STATUS_SUCCESS,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::scheduler::DAILY_ANALYSIS_JOB;

/// Locale used by scheduled runs
pub const SCHEDULED_LOCALE: &str = "en-US";

/// Daily analysis runner
#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<dyn CopilotStore>,
    insight: Arc<dyn InsightProvider>,
}

impl AnalysisService {
    pub fn new(store: Arc<dyn CopilotStore>, insight: Arc<dyn InsightProvider>) -> Self {
        Self { store, insight }
    }

    /// Produce and store the insight for one date
    ///
    /// A failed attempt is stored as a `FAILED` report before the error is
    /// returned.
    pub async fn run_daily(
        &self,
        report_date: &str,
        locale: &str,
        source: &str,
    ) -> CopilotResult<DailyInsight> {
        match self.analyze(report_date, locale, source).await {
            Ok(insight) => Ok(insight),
            Err(err) => {
                let failed = NewAnalysisReport {
                    report_date: report_date.to_string(),
                    locale: locale.to_string(),
                    source: source.to_string(),
                    status: STATUS_FAILED.to_string(),
                    summary: String::new(),
                    anomalies: Vec::new(),
                    recommendations: Vec::new(),
                    error_message: Some(err.to_string()),
                };
                if let Err(store_err) = self.store.add_analysis_report(failed).await {
                    warn!("Could not store failed analysis report: {}", store_err);
                }
                Err(err)
            }
        }
    }

    async fn analyze(
        &self,
        report_date: &str,
        locale: &str,
        source: &str,
    ) -> CopilotResult<DailyInsight> {
        let (glucose_count, therapy_count) = self.store.counts().await?;
        let context_hint = format!(
            "source={}, glucose_points={}, therapy_events={}",
            source, glucose_count, therapy_count
        );

        let insight = self
            .insight
            .daily_insight(report_date, locale, &context_hint)
            .await?;

        self.store
            .add_analysis_report(NewAnalysisReport {
                report_date: report_date.to_string(),
                locale: locale.to_string(),
                source: source.to_string(),
                status: STATUS_SUCCESS.to_string(),
                summary: insight.summary.clone(),
                anomalies: insight.anomalies.clone(),
                recommendations: insight.recommendations.clone(),
                error_message: None,
            })
            .await?;

        info!(
            date = report_date,
            source,
            anomalies = insight.anomalies.len(),
            "Daily analysis stored"
        );
        Ok(insight)
    }

    /// User-started run; also updates the `daily-analysis` job status
    pub async fn run_manual(&self, report_date: &str, locale: &str) -> CopilotResult<DailyInsight> {
        match self.run_daily(report_date, locale, SOURCE_MANUAL).await {
            Ok(insight) => {
                let message = format!(
                    "manual=true, anomalies={}, recommendations={}",
                    insight.anomalies.len(),
                    insight.recommendations.len()
                );
                self.store
                    .record_job_status(DAILY_ANALYSIS_JOB, STATUS_SUCCESS, &message)
                    .await?;
                Ok(insight)
            }
            Err(err) => {
                let message = format!("manual=true, error={}", err);
                if let Err(store_err) = self
                    .store
                    .record_job_status(DAILY_ANALYSIS_JOB, STATUS_FAILED, &message)
                    .await
                {
                    warn!("Could not record daily-analysis status: {}", store_err);
                }
                Err(err)
            }
        }
    }

    /// Scheduler-started run; returns the job status message
    pub async fn run_scheduled(&self, report_date: &str) -> CopilotResult<String> {
        let insight = self
            .run_daily(report_date, SCHEDULED_LOCALE, SOURCE_SCHEDULER)
            .await?;
        Ok(format!(
            "anomalies={}, recommendations={}",
            insight.anomalies.len(),
            insight.recommendations.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use glucopilot_core::{CopilotError, FallbackInsight};
    use glucopilot_store::{AnalysisFilter, LocalStore};

    struct BrokenInsight;

    #[async_trait]
    impl InsightProvider for BrokenInsight {
        async fn daily_insight(
            &self,
            _date: &str,
            _locale: &str,
            _context_hint: &str,
        ) -> CopilotResult<DailyInsight> {
            Err(CopilotError::insight("upstream timeout"))
        }
    }

    fn service(insight: Arc<dyn InsightProvider>) -> (AnalysisService, Arc<LocalStore>) {
        let store = Arc::new(LocalStore::in_memory());
        (AnalysisService::new(store.clone(), insight), store)
    }

    #[tokio::test]
    async fn test_manual_run_records_report_and_status() {
        let (service, store) = service(Arc::new(FallbackInsight));
        let insight = service.run_manual("2026-02-27", "en-US").await.unwrap();
        assert!(insight.summary.contains("not configured"));

        let reports = store
            .list_analysis_reports(&AnalysisFilter::default())
            .await
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, STATUS_SUCCESS);
        assert_eq!(reports[0].source, SOURCE_MANUAL);

        let status = store.get_job_status(DAILY_ANALYSIS_JOB).await.unwrap();
        assert_eq!(status.last_status.as_deref(), Some(STATUS_SUCCESS));
        assert_eq!(
            status.last_message.as_deref(),
            Some("manual=true, anomalies=1, recommendations=1")
        );
        assert!(status.last_success_ts.is_some());
    }

    #[tokio::test]
    async fn test_failed_run_is_stored_and_propagated() {
        let (service, store) = service(Arc::new(BrokenInsight));
        let err = service.run_manual("2026-02-27", "ru-RU").await.unwrap_err();
        assert!(matches!(err, CopilotError::Insight(_)));

        let reports = store
            .list_analysis_reports(&AnalysisFilter::default())
            .await
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, STATUS_FAILED);
        assert_eq!(reports[0].locale, "ru-RU");
        assert_eq!(
            reports[0].error_message.as_deref(),
            Some("Insight error: upstream timeout")
        );

        let status = store.get_job_status(DAILY_ANALYSIS_JOB).await.unwrap();
        assert_eq!(status.last_status.as_deref(), Some(STATUS_FAILED));
        assert_eq!(
            status.last_message.as_deref(),
            Some("manual=true, error=Insight error: upstream timeout")
        );
        assert_eq!(status.last_success_ts, None);
    }

    #[tokio::test]
    async fn test_scheduled_run_message() {
        let (service, store) = service(Arc::new(FallbackInsight));
        let message = service.run_scheduled("2026-02-27").await.unwrap();
        assert_eq!(message, "anomalies=1, recommendations=1");

        let reports = store
            .list_analysis_reports(&AnalysisFilter::default().with_source(SOURCE_SCHEDULER))
            .await
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].locale, SCHEDULED_LOCALE);
    }
}
