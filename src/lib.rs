//! Glucopilot
//!
//! Predictive glucose copilot: short-horizon forecasts, a post-hypo rebound
//! safety rule, and a replay engine that backtests both against stored
//! history.
//!
//! The workspace is split into:
//! - [`glucopilot_core`]: data model, forecaster, rule evaluator, configuration, insight
//! - [`glucopilot_eval`]: replay engine, accuracy statistics, baselines, reports
//! - [`glucopilot_store`]: storage trait and the local JSON-snapshot store
//!
//! The `glucopilot` binary lives in `crates/glucopilot-cli`.
//!
//! # Example
//!
//! ```rust,ignore
//! use glucopilot::glucopilot_eval::{ReportFormat, generate_report};
//! use glucopilot::{CopilotStore, LocalStore, build_replay_report};
//!
//! let store = LocalStore::open("store.json").await?;
//! let glucose = store.list_glucose(Some(since), Some(until)).await?;
//! let therapy = store.list_therapy_events(Some(since), Some(until)).await?;
//! let report = build_replay_report(&glucose, &therapy, since, until, 5);
//! println!("{}", generate_report(&report, ReportFormat::Markdown)?);
//! ```

pub use glucopilot_core;
pub use glucopilot_eval;
pub use glucopilot_store;

pub use glucopilot_core::{
    CopilotConfig, CopilotError, CopilotResult, Forecast, GlucoseReading, RuleDecision,
    RuleState, TherapyEvent,
};
pub use glucopilot_eval::{ReplayReport, build_replay_report};
pub use glucopilot_store::{CopilotStore, LocalStore};
