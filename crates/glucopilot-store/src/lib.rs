//! Storage and persistence for Glucopilot
//!
//! This crate provides the storage collaborator including:
//! - Glucose readings and therapy events with sync pull/push
//! - Idempotent temp-target actions
//! - Model registry and job status bookkeeping
//! - Daily analysis history and weekly trends
//! - Local JSON snapshot storage

pub mod records;
pub mod storage;

pub use records::{
    ActionRecord, AnalysisFilter, AnalysisHistoryRecord, JobStatusSnapshot, ModelInfo,
    NewAnalysisReport, PullResult, PushBatch, PushResult, SOURCE_MANUAL, SOURCE_SCHEDULER,
    STATUS_FAILED, STATUS_SUCCESS, TempTargetRequest, WeeklyTrendRecord,
};
pub use storage::{CopilotStore, LocalStore, StoreError, StoreResult, weekly_trend};
