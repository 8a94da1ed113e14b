//! Historical replay of forecasts and rules
//!
//! This module runs the simulation over stored history, resolves replay
//! requests, and records baselines to detect regressions between runs.

mod engine;
mod matcher;
mod recorder;
mod regression;
mod request;

pub use engine::{
    GLUCOSE_WINDOW_READINGS, MIN_REPLAY_POINTS, ReplayEngine, THERAPY_WINDOW_MS, WARMUP_READINGS,
    build_replay_report, stride_for,
};
pub use matcher::{closest_reading, tolerance_ms};
pub use recorder::{Baseline, BaselineRecorder};
pub use regression::{Regression, RegressionConfig, RegressionDetector, RegressionType};
pub use request::{ReplayRequest, ReplayWindow};
