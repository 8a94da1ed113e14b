//! Glucopilot replay evaluation
//!
//! This crate backtests the forecaster and safety rules against stored
//! glucose history.
//!
//! # Features
//!
//! - **Replay**: step through history as if it were arriving live
//! - **Metrics**: MAE, RMSE and MARD per horizon, day type and hour, plus drift
//! - **Baselines**: save reports and flag regressions against them
//! - **Report Generation**: JSON, Markdown and terminal table output
//!
//! # Example
//!
//! ```rust,ignore
//! use glucopilot_eval::{ReportFormat, build_replay_report, generate_report};
//!
//! let report = build_replay_report(&glucose, &therapy, since, until, 5);
//! println!("{}", generate_report(&report, ReportFormat::Table)?);
//! ```

pub mod metrics;
pub mod replay;
pub mod report;

// Re-exports for convenience
pub use metrics::{
    DayType, DayTypeStats, DriftStats, ErrorSample, ForecastStats, HourStats, ReplayReport,
    RuleStats,
};
pub use replay::{
    Baseline, BaselineRecorder, RegressionDetector, ReplayEngine, ReplayRequest, ReplayWindow,
    build_replay_report,
};
pub use report::{ReportFormat, generate_report};
