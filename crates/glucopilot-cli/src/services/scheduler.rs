//! Job scheduler
//!
//! Two tracked jobs run on fixed wall-clock schedules in the configured
//! timezone: the daily analysis at 02:00 and the weekly model retrain on
//! Sundays at 03:00. Every run is recorded through the store's job status.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};
use glucopilot_core::config::parse_timezone;
use glucopilot_core::{CopilotError, CopilotResult};
use glucopilot_store::{CopilotStore, JobStatusSnapshot, STATUS_FAILED, STATUS_SUCCESS};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analysis::AnalysisService;

/// Daily analysis job id
pub const DAILY_ANALYSIS_JOB: &str = "daily-analysis";

/// Weekly retrain job id
pub const WEEKLY_RETRAIN_JOB: &str = "weekly-retrain";

/// When a job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSchedule {
    /// Every day at the given time
    Daily { hour: u32, minute: u32 },
    /// Once a week on the given day and time
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

impl JobSchedule {
    fn time(&self) -> Option<NaiveTime> {
        match *self {
            Self::Daily { hour, minute } | Self::Weekly { hour, minute, .. } => {
                NaiveTime::from_hms_opt(hour, minute, 0)
            }
        }
    }

    fn fires_on(&self, weekday: Weekday) -> bool {
        match *self {
            Self::Daily { .. } => true,
            Self::Weekly { weekday: day, .. } => day == weekday,
        }
    }
}

/// A job the scheduler runs and reports on
#[derive(Debug, Clone, Copy)]
pub struct TrackedJob {
    pub id: &'static str,
    pub schedule: JobSchedule,
}

/// All tracked jobs in reporting order
pub const TRACKED_JOBS: [TrackedJob; 2] = [
    TrackedJob {
        id: DAILY_ANALYSIS_JOB,
        schedule: JobSchedule::Daily { hour: 2, minute: 0 },
    },
    TrackedJob {
        id: WEEKLY_RETRAIN_JOB,
        schedule: JobSchedule::Weekly {
            weekday: Weekday::Sun,
            hour: 3,
            minute: 0,
        },
    },
];

/// Look up a tracked job by id
pub fn tracked_job(job_id: &str) -> Option<TrackedJob> {
    TRACKED_JOBS.iter().copied().find(|job| job.id == job_id)
}

/// First fire time strictly after `now`, in `now`'s offset
pub fn next_run_after(
    schedule: JobSchedule,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let time = schedule.time()?;
    let today = now.date_naive();

    (0..=7u64)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter(|day| schedule.fires_on(day.weekday()))
        .filter_map(|day| now.timezone().from_local_datetime(&day.and_time(time)).single())
        .find(|candidate| *candidate > now)
}

/// Outcome of one job run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub job_id: String,
    pub status: String,
    pub message: String,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Job snapshot plus its next fire time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    #[serde(flatten)]
    pub snapshot: JobStatusSnapshot,
    pub next_run_ts: Option<i64>,
}

/// Jobs status view
#[derive(Debug, Clone, Serialize)]
pub struct JobsStatus {
    pub timezone: String,
    pub jobs: Vec<JobStatusView>,
}

/// Runs tracked jobs and records their outcomes
pub struct Scheduler {
    store: Arc<dyn CopilotStore>,
    analysis: AnalysisService,
    timezone: FixedOffset,
    timezone_label: String,
}

impl Scheduler {
    /// Create a scheduler for a timezone label such as `UTC` or `+03:00`
    pub fn new(
        store: Arc<dyn CopilotStore>,
        analysis: AnalysisService,
        timezone: &str,
    ) -> CopilotResult<Self> {
        Ok(Self {
            store,
            analysis,
            timezone: parse_timezone(timezone)?,
            timezone_label: timezone.trim().to_string(),
        })
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Run `work` and record SUCCESS or FAILED for `job_id`
    ///
    /// Work errors are captured in the outcome; only a failure to record
    /// the status is returned as an error.
    pub async fn run_job<W>(&self, job_id: &str, work: W) -> CopilotResult<JobOutcome>
    where
        W: Future<Output = CopilotResult<String>>,
    {
        let (status, message) = match work.await {
            Ok(message) if message.is_empty() => (STATUS_SUCCESS, "ok".to_string()),
            Ok(message) => (STATUS_SUCCESS, message),
            Err(err) => {
                let text = err.to_string();
                warn!(job = job_id, "Job failed: {}", text);
                let text = if text.is_empty() {
                    "unknown_error".to_string()
                } else {
                    text
                };
                (STATUS_FAILED, text)
            }
        };

        self.store
            .record_job_status(job_id, status, &message)
            .await?;
        info!(job = job_id, status, "{}", message);

        Ok(JobOutcome {
            job_id: job_id.to_string(),
            status: status.to_string(),
            message,
        })
    }

    /// Run a tracked job by id
    pub async fn run_tracked(&self, job_id: &str) -> CopilotResult<JobOutcome> {
        match job_id {
            DAILY_ANALYSIS_JOB => {
                let report_date = self.now().date_naive().format("%Y-%m-%d").to_string();
                self.run_job(job_id, self.analysis.run_scheduled(&report_date))
                    .await
            }
            WEEKLY_RETRAIN_JOB => self.run_job(job_id, self.weekly_retrain()).await,
            other => Err(CopilotError::invalid_input(format!(
                "Unknown job '{}' (expected {} or {})",
                other, DAILY_ANALYSIS_JOB, WEEKLY_RETRAIN_JOB
            ))),
        }
    }

    async fn weekly_retrain(&self) -> CopilotResult<String> {
        self.store.touch_weekly_retrain().await?;
        let models = self.store.list_active_models().await?;
        Ok(format!("models_updated={}", models.len()))
    }

    /// Snapshot of every tracked job with its next fire time
    pub async fn status(&self) -> CopilotResult<JobsStatus> {
        let now = self.now();
        let mut jobs = Vec::with_capacity(TRACKED_JOBS.len());

        for job in TRACKED_JOBS {
            let snapshot = self.store.get_job_status(job.id).await?;
            let next_run_ts = next_run_after(job.schedule, now).map(|at| at.timestamp_millis());
            jobs.push(JobStatusView {
                snapshot,
                next_run_ts,
            });
        }

        Ok(JobsStatus {
            timezone: self.timezone_label.clone(),
            jobs,
        })
    }

    /// Earliest upcoming job after `from`
    fn next_due(&self, from: DateTime<FixedOffset>) -> Option<(TrackedJob, DateTime<FixedOffset>)> {
        TRACKED_JOBS
            .iter()
            .filter_map(|job| next_run_after(job.schedule, from).map(|at| (*job, at)))
            .min_by_key(|(_, at)| *at)
    }

    /// Run jobs as they come due until `shutdown` resolves
    pub async fn run_until<S>(&self, shutdown: S) -> CopilotResult<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(timezone = %self.timezone_label, "Scheduler started");

        // Never fire the same slot twice when the sleep wakes a little early
        let mut cursor = self.now();

        loop {
            let from = self.now().max(cursor);
            let (job, at) = self
                .next_due(from)
                .ok_or_else(|| CopilotError::other("No upcoming job run"))?;
            let wait = (at - self.now()).to_std().unwrap_or_default();
            debug!(job = job.id, next_run = %at, "Waiting for next job");

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopped");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {
                    cursor = at;
                    let outcome = self.run_tracked(job.id).await?;
                    if !outcome.succeeded() {
                        warn!(job = job.id, "Scheduled run failed: {}", outcome.message);
                    }
                }
            }
        }
    }
}
