//! Glucopilot CLI application
//!
//! Command-line front end for the glucose copilot: replay backtesting,
//! forecasts and rule checks, device sync, actions, daily analysis and the
//! job scheduler.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/glucopilot-cli
//! ```
//!
//! # Commands Overview
//!
//! ## Replay
//! Re-simulate the forecaster and safety rule over stored history and print
//! accuracy statistics. Reports can be saved as baselines and compared.
//!
//! - **Command:** `glucopilot replay --since <ms> --until <ms>`
//! - **Compare:** `glucopilot compare --baseline <file|id> --current <file>`
//!
//! ## Sync and actions
//! Exchange readings and therapy events with a client device and accept
//! temp-target actions with idempotency keys.
//!
//! ## Analysis and jobs
//! Daily AI summaries, their history and weekly trend, plus the
//! `daily-analysis` and `weekly-retrain` jobs (`glucopilot daemon`).

#![allow(clippy::collapsible_if)]

mod args;
mod commands;
mod console;
mod context;
mod logging;
mod router;
mod services;

use anyhow::Result;
use clap::Parser;

pub use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = context::load_cli_config(&cli)?;

    // RUST_LOG=debug overrides the configured level
    logging::init_logging(&config.logging, cli.verbose);

    router::route(cli, config).await
}
