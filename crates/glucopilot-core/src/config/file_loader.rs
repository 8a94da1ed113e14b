//! File-based configuration loading

use super::model::CopilotConfig;
use crate::error::{CopilotError, CopilotResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> CopilotResult<CopilotConfig> {
    if !path.exists() {
        tracing::debug!("Config file {:?} not found, using defaults", path);
        return Ok(CopilotConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        CopilotError::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let config: CopilotConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            CopilotError::config(format!("Failed to parse TOML config: {}", e))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            CopilotError::config(format!("Failed to parse YAML config: {}", e))
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            CopilotError::config(format!("Failed to parse JSON config: {}", e))
        })?,
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_from_file(Path::new("/nonexistent/glucopilot.json")).unwrap();
        assert_eq!(config.timezone, "UTC");
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("glucopilot.json");
        fs::write(
            &path,
            r#"{
                "timezone": "+02:00",
                "store_path": "/var/lib/glucopilot/store.json",
                "replay": { "step_minutes": 15 },
                "logging": { "level": "debug", "format": "json" }
            }"#,
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.timezone, "+02:00");
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/var/lib/glucopilot/store.json"))
        );
        assert_eq!(config.replay.step_minutes, 15);
        assert_eq!(config.replay.lookback_days, 14);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("glucopilot.toml");
        fs::write(
            &path,
            "timezone = \"UTC\"\n\n[insight]\nmodel = \"gpt-5\"\nmax_output_tokens = 800\n",
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.insight.model, "gpt-5");
        assert_eq!(config.insight.max_output_tokens, 800);
        assert!(config.insight.api_key.is_none());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("glucopilot.yaml");
        fs::write(&path, "replay:\n  lookback_days: 30\n").unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.replay.lookback_days, 30);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(CopilotError::Config(_))
        ));
    }
}
