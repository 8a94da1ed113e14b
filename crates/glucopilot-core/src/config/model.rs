//! Configuration data model

use crate::error::{CopilotError, CopilotResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::timezone::parse_timezone;

/// Top-level Glucopilot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopilotConfig {
    /// Timezone used by the job scheduler (`UTC` or a fixed offset like `+03:00`)
    pub timezone: String,

    /// Location of the local store snapshot
    pub store_path: Option<PathBuf>,

    /// Replay defaults
    pub replay: ReplayDefaults,

    /// Daily insight provider settings
    pub insight: InsightConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            store_path: None,
            replay: ReplayDefaults::default(),
            insight: InsightConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CopilotConfig {
    /// Store path, falling back to `~/.glucopilot/store.json`
    pub fn resolved_store_path(&self) -> CopilotResult<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".glucopilot").join("store.json"))
            .ok_or_else(|| CopilotError::config("Home directory is not available"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> CopilotResult<()> {
        parse_timezone(&self.timezone)?;

        if self.replay.step_minutes == 0 {
            return Err(CopilotError::config("replay.step_minutes must be at least 1"));
        }
        if self.replay.lookback_days == 0 {
            return Err(CopilotError::config("replay.lookback_days must be at least 1"));
        }
        if self.insight.max_output_tokens == 0 {
            return Err(CopilotError::config(
                "insight.max_output_tokens must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Defaults applied to replay requests that omit fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayDefaults {
    /// Simulation step in minutes
    pub step_minutes: u32,

    /// Window length when `since` is omitted
    pub lookback_days: u32,
}

impl Default for ReplayDefaults {
    fn default() -> Self {
        Self {
            step_minutes: 5,
            lookback_days: 14,
        }
    }
}

/// Daily insight provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// API key; the deterministic fallback is used when absent
    pub api_key: Option<String>,

    /// Model name
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Output token cap per request
    pub max_output_tokens: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-5-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_output_tokens: 500,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
