//! Command routing logic for CLI

use anyhow::Result;
use chrono::Utc;
use glucopilot_core::CopilotConfig;
use glucopilot_store::TempTargetRequest;

use crate::args::{ActionCommand, AnalysisAction, Cli, Commands, JobsAction, SyncAction};
use crate::commands;
use crate::commands::replay::ReplayOptions;
use crate::console::CliConsole;
use crate::context::AppContext;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: CopilotConfig) -> Result<()> {
    let console = CliConsole::new(cli.verbose);

    // Pure commands need no store
    match &cli.command {
        Commands::Predict { input } => return commands::predict::predict(input, &console).await,
        Commands::Rules { input } => return commands::predict::rules(input, &console).await,
        _ => {}
    }

    let ctx = AppContext::open(config).await?;
    console.info(&format!("Store: {}", ctx.store_path().display()));

    match cli.command {
        Commands::Replay {
            since,
            until,
            step_minutes,
            format,
            output,
            save_baseline,
            baseline_dir,
        } => {
            commands::replay::run(
                &ctx,
                ReplayOptions {
                    since,
                    until,
                    step_minutes,
                    format,
                    output,
                    save_baseline,
                    baseline_dir,
                },
                &console,
            )
            .await
        }

        Commands::Compare {
            baseline,
            current,
            baseline_dir,
        } => commands::replay::compare(&ctx, &baseline, &current, baseline_dir.as_deref()).await,

        Commands::Sync { action } => match action {
            SyncAction::Pull { since } => commands::sync::pull(&ctx, since, &console).await,
            SyncAction::Push { input } => commands::sync::push(&ctx, &input, &console).await,
        },

        Commands::Action { action } => match action {
            ActionCommand::TempTarget {
                id,
                target,
                duration,
                key,
            } => {
                let request = TempTargetRequest {
                    id,
                    target_mmol: target,
                    duration_minutes: duration,
                    idempotency_key: key,
                };
                commands::action::temp_target(&ctx, request, &console).await
            }
            ActionCommand::Show { id } => commands::action::show(&ctx, &id, &console).await,
        },

        Commands::Analysis { action } => route_analysis(&ctx, action, &console).await,

        Commands::Models => commands::jobs::models(&ctx, &console).await,

        Commands::Jobs { action } => match action {
            JobsAction::Status => commands::jobs::status(&ctx, &console).await,
            JobsAction::Run { job } => commands::jobs::run(&ctx, &job, &console).await,
        },

        Commands::Daemon => commands::jobs::daemon(&ctx, &console).await,

        Commands::Predict { .. } | Commands::Rules { .. } => Ok(()),
    }
}

async fn route_analysis(ctx: &AppContext, action: AnalysisAction, console: &CliConsole) -> Result<()> {
    match action {
        AnalysisAction::Daily { date, locale } => {
            commands::analysis::daily(ctx, date, &locale, console).await
        }
        AnalysisAction::History {
            limit,
            source,
            status,
            days,
        } => {
            let filter = commands::analysis::history_filter(
                limit,
                source,
                status,
                days,
                Utc::now().timestamp_millis(),
            );
            commands::analysis::history(ctx, filter, console).await
        }
        AnalysisAction::Trend {
            weeks,
            source,
            status,
        } => {
            commands::analysis::trend(ctx, weeks, source.as_deref(), status.as_deref(), console)
                .await
        }
    }
}
