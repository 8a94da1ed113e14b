//! Replay request resolution
//!
//! Fills in the optional window bounds and step of a replay request and
//! rejects empty or inverted windows before any simulation runs.

use glucopilot_core::config::ReplayDefaults;
use glucopilot_core::{CopilotError, CopilotResult, DAY_MS};
use serde::{Deserialize, Serialize};

/// Replay parameters as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_minutes: Option<u32>,
}

/// A replay window with every parameter decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayWindow {
    pub since: i64,
    pub until: i64,
    pub step_minutes: u32,
}

impl ReplayRequest {
    pub fn new(since: Option<i64>, until: Option<i64>, step_minutes: Option<u32>) -> Self {
        Self {
            since,
            until,
            step_minutes,
        }
    }

    /// Resolve against the current time and configured defaults
    pub fn resolve(&self, now_ms: i64, defaults: &ReplayDefaults) -> CopilotResult<ReplayWindow> {
        let until = self.until.unwrap_or(now_ms);
        let since = self
            .since
            .unwrap_or_else(|| until.saturating_sub(i64::from(defaults.lookback_days) * DAY_MS));
        let step_minutes = self.step_minutes.unwrap_or(defaults.step_minutes);

        if since >= until {
            return Err(CopilotError::invalid_range(since, until));
        }

        Ok(ReplayWindow {
            since,
            until,
            step_minutes,
        })
    }
}
