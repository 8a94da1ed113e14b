//! Configuration management for Glucopilot
//!
//! Configuration is layered: defaults, then an optional file (JSON, TOML or
//! YAML), then environment overrides. The result is validated before use.

mod env_loader;
mod file_loader;
mod model;
mod timezone;

pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::load_from_file;
pub use model::{CopilotConfig, InsightConfig, LoggingConfig, ReplayDefaults};
pub use timezone::parse_timezone;

use crate::error::CopilotResult;
use std::path::Path;

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> CopilotResult<CopilotConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => CopilotConfig::default(),
    };
    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}
