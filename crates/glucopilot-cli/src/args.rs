//! CLI argument definitions using clap
//!
//! - glucopilot replay            # Backtest forecasts and rules
//! - glucopilot compare           # Compare a report with a baseline
//! - glucopilot predict / rules   # One-off forecast or rule check
//! - glucopilot sync / action     # Device exchange and actions
//! - glucopilot analysis          # Daily insight, history and trend
//! - glucopilot models / jobs     # Model registry and job bookkeeping
//! - glucopilot daemon            # Run the job scheduler

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default locale for daily analysis
pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Parser)]
#[command(name = "glucopilot")]
#[command(about = "Glucopilot - predictive glucose copilot and replay backtester")]
#[command(
    long_about = r#"Glucopilot - predictive glucose copilot and replay backtester

USAGE:
  glucopilot replay                     # Replay the last 14 days
  glucopilot replay --format json       # Machine-readable report
  glucopilot compare --baseline b.json --current c.json
  glucopilot sync pull --since 0        # Readings and events since a cursor
  glucopilot analysis daily             # Run today's daily analysis
  glucopilot jobs status                # Scheduled jobs and their last runs
  glucopilot daemon                     # Run scheduled jobs until Ctrl-C

For detailed help: glucopilot --help"#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (JSON, TOML or YAML)
    #[arg(long, global = true, env = "COPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the store snapshot (overrides the configuration)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay stored history through the forecaster and rule
    Replay {
        /// Window start in unix milliseconds (default: until - lookback)
        #[arg(long)]
        since: Option<i64>,

        /// Window end in unix milliseconds (default: now)
        #[arg(long)]
        until: Option<i64>,

        /// Simulation step in minutes
        #[arg(long)]
        step_minutes: Option<u32>,

        /// Output format (json, markdown, table)
        #[arg(long, default_value = "table")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Save the report as a named baseline
        #[arg(long)]
        save_baseline: Option<String>,

        /// Directory for baselines (default: next to the store)
        #[arg(long)]
        baseline_dir: Option<PathBuf>,
    },

    /// Compare a replay report against a baseline
    Compare {
        /// Baseline file, or id/name of a saved baseline
        #[arg(long)]
        baseline: String,

        /// Current report or baseline file
        #[arg(long)]
        current: PathBuf,

        /// Directory for baselines (default: next to the store)
        #[arg(long)]
        baseline_dir: Option<PathBuf>,
    },

    /// Forecast from a JSON array of readings
    Predict {
        /// Input file
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Evaluate the safety rule on a JSON array of readings
    Rules {
        /// Input file
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Exchange readings and therapy events
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },

    /// Accept or inspect actions
    Action {
        #[command(subcommand)]
        action: ActionCommand,
    },

    /// Daily AI analysis
    Analysis {
        #[command(subcommand)]
        action: AnalysisAction,
    },

    /// List the active model registry
    Models,

    /// Scheduled job bookkeeping
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Run the job scheduler until interrupted
    Daemon,
}

#[derive(Subcommand, Clone)]
pub enum SyncAction {
    /// Readings and events with timestamps at or after a cursor
    Pull {
        /// Cursor in unix milliseconds
        #[arg(long, default_value_t = 0)]
        since: i64,
    },

    /// Upload a batch `{ "glucose": [...], "therapyEvents": [...] }`
    Push {
        /// Input file
        #[arg(long, short)]
        input: PathBuf,
    },
}

#[derive(Subcommand, Clone)]
pub enum ActionCommand {
    /// Request a temporary target
    TempTarget {
        /// Action id
        #[arg(long)]
        id: String,

        /// Target in mmol/L
        #[arg(long)]
        target: f64,

        /// Duration in minutes
        #[arg(long)]
        duration: u32,

        /// Idempotency key
        #[arg(long)]
        key: String,
    },

    /// Show an action by id
    Show {
        /// Action id
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum AnalysisAction {
    /// Run the daily analysis now
    Daily {
        /// Report date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Locale passed to the insight provider
        #[arg(long, default_value = DEFAULT_LOCALE)]
        locale: String,
    },

    /// List stored analysis runs, newest first
    History {
        /// Maximum number of runs (1-365)
        #[arg(long, default_value_t = 30)]
        limit: u32,

        /// Only runs from this source (manual, scheduler)
        #[arg(long)]
        source: Option<String>,

        /// Only runs with this status (SUCCESS, FAILED)
        #[arg(long)]
        status: Option<String>,

        /// Look-back window in days (1-365)
        #[arg(long, default_value_t = 60)]
        days: u32,
    },

    /// Weekly roll-up of analysis runs
    Trend {
        /// Number of weeks (1-52)
        #[arg(long, default_value_t = 8)]
        weeks: u32,

        /// Only runs from this source
        #[arg(long)]
        source: Option<String>,

        /// Only runs with this status
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum JobsAction {
    /// Show tracked jobs with their last and next runs
    Status,

    /// Run a tracked job now
    Run {
        /// Job id (daily-analysis, weekly-retrain)
        job: String,
    },
}
