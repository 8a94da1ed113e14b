//! Shared command context
//!
//! Resolves configuration and opens the store once per invocation.

use anyhow::{Context, Result};
use glucopilot_core::insight::provider_from_config;
use glucopilot_core::{CopilotConfig, load_config};
use glucopilot_store::{CopilotStore, LocalStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::args::Cli;
use crate::services::{AnalysisService, Scheduler};

/// Load the configuration and apply command-line overrides
pub fn load_cli_config(cli: &Cli) -> Result<CopilotConfig> {
    let mut config = load_config(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }

    Ok(config)
}

/// Configuration plus an opened store
pub struct AppContext {
    pub config: CopilotConfig,
    pub store: Arc<dyn CopilotStore>,
    store_path: PathBuf,
}

impl AppContext {
    /// Open the configured store, seeding it on first use
    pub async fn open(config: CopilotConfig) -> Result<Self> {
        let store_path = config.resolved_store_path()?;
        let store = LocalStore::open(&store_path)
            .await
            .with_context(|| format!("Failed to open store at {}", store_path.display()))?;
        store.ensure_seed_data().await?;
        debug!("Using store {}", store_path.display());

        Ok(Self {
            config,
            store: Arc::new(store),
            store_path,
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Baseline directory: the override, else `baselines/` next to the store
    pub fn baseline_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .store_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("baselines"),
        }
    }

    /// Daily analysis service with the configured insight provider
    pub fn analysis(&self) -> AnalysisService {
        let insight = provider_from_config(&self.config.insight);
        AnalysisService::new(self.store.clone(), Arc::from(insight))
    }

    /// Scheduler in the configured timezone
    pub fn scheduler(&self) -> Result<Scheduler> {
        Ok(Scheduler::new(
            self.store.clone(),
            self.analysis(),
            &self.config.timezone,
        )?)
    }
}
