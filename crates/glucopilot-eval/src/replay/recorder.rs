//! Baseline recorder
//!
//! Saves replay reports as named baselines that later runs are compared to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::ReplayReport;

const BASELINE_SUFFIX: &str = ".baseline.json";

/// A saved replay report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    /// Unique identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Recording timestamp
    pub recorded_at: DateTime<Utc>,

    /// The report captured
    pub report: ReplayReport,
}

/// Recorder for creating and reading baselines
pub struct BaselineRecorder {
    /// Directory holding `{id}.baseline.json` files
    output_dir: PathBuf,
}

impl BaselineRecorder {
    /// Create a new baseline recorder
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Record a report as a baseline
    pub async fn record(&self, name: &str, report: &ReplayReport) -> Result<Baseline> {
        let baseline = Baseline {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            recorded_at: Utc::now(),
            report: report.clone(),
        };

        self.save(&baseline).await?;
        Ok(baseline)
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", id, BASELINE_SUFFIX))
    }

    async fn save(&self, baseline: &Baseline) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create baseline directory {:?}", self.output_dir))?;

        let path = self.path_for(&baseline.id);
        let json = serde_json::to_string_pretty(baseline)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to save baseline to {:?}", path))?;

        tracing::info!("Saved baseline: {} -> {:?}", baseline.name, path);
        Ok(())
    }

    /// Load a baseline by id
    pub async fn load(&self, id: &str) -> Result<Baseline> {
        let path = self.path_for(id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read baseline from {:?}", path))?;

        let baseline: Baseline = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse baseline {:?}", path))?;
        Ok(baseline)
    }

    /// Find a baseline by id, falling back to the newest with that name
    pub async fn find(&self, id_or_name: &str) -> Result<Baseline> {
        if self.path_for(id_or_name).exists() {
            return self.load(id_or_name).await;
        }

        self.list()
            .await?
            .into_iter()
            .find(|b| b.name == id_or_name)
            .with_context(|| format!("No baseline with id or name '{}'", id_or_name))
    }

    /// List all baselines, newest first
    pub async fn list(&self) -> Result<Vec<Baseline>> {
        let mut baselines = Vec::new();

        if !self.output_dir.exists() {
            return Ok(baselines);
        }

        let mut entries = tokio::fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().ends_with(BASELINE_SUFFIX))
            {
                let content = tokio::fs::read_to_string(&path).await?;
                match serde_json::from_str::<Baseline>(&content) {
                    Ok(baseline) => baselines.push(baseline),
                    Err(e) => tracing::warn!("Skipping unreadable baseline {:?}: {}", path, e),
                }
            }
        }

        baselines.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(baselines)
    }
}
