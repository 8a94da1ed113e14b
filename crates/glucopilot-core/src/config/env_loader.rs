//! Environment variable overrides

use super::model::CopilotConfig;
use std::env;
use std::path::PathBuf;

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut CopilotConfig) {
    apply_overrides_from(config, |key| env::var(key).ok());
}

/// Apply overrides using a custom variable lookup
pub fn apply_overrides_from<F>(config: &mut CopilotConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(timezone) = non_empty("COPILOT_TIMEZONE") {
        config.timezone = timezone;
    }

    if let Some(path) = non_empty("COPILOT_STORE_PATH") {
        config.store_path = Some(PathBuf::from(path));
    }

    if let Some(level) = non_empty("COPILOT_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(api_key) = non_empty("OPENAI_API_KEY") {
        config.insight.api_key = Some(api_key);
    }

    if let Some(model) = non_empty("OPENAI_MODEL") {
        config.insight.model = model;
    }

    if let Some(base_url) = non_empty("OPENAI_BASE_URL") {
        config.insight.base_url = base_url;
    }
}
