//! Glucopilot core library
//!
//! Shared building blocks for the diabetes-management copilot:
//!
//! - **Types**: glucose readings, therapy events, forecasts and rule decisions
//! - **Forecasting**: a deterministic 5/60-minute trend extrapolator
//! - **Rules**: the post-hypo rebound safety guard
//! - **Configuration**: layered file + environment configuration
//! - **Insight**: the AI-assisted daily summary provider

pub mod config;
pub mod error;
pub mod forecast;
pub mod insight;
pub mod rules;
pub mod types;

pub use config::{CopilotConfig, load_config};
pub use error::{CopilotError, CopilotResult};
pub use forecast::{Forecaster, TrendForecaster, forecast};
pub use insight::{DailyInsight, FallbackInsight, InsightProvider, OpenAiInsight};
pub use rules::{
    POST_HYPO_REBOUND_RULE_ID, PostHypoReboundGuard, RuleEvaluator, evaluate_post_hypo_rebound,
};
pub use types::{
    ActionProposal, DAY_MS, Forecast, GlucoseReading, HOUR_MS, MINUTE_MS, RuleDecision, RuleState,
    TherapyEvent,
};
