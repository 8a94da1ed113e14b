//! Model registry, job status and scheduler daemon commands

use anyhow::{Result, bail};
use colored::*;
use tracing::info;

use crate::console::{CliConsole, format_ts, status_label};
use crate::context::AppContext;
use crate::services::JobsStatus;
use crate::services::scheduler::tracked_job;

/// List the active model registry
pub async fn models(ctx: &AppContext, console: &CliConsole) -> Result<()> {
    let models = ctx.store.list_active_models().await?;

    console.print_header("Active models");
    println!(
        "{:<8} {:<22} {:>8} {:<24}",
        "Horizon", "Model", "MAE", "Updated"
    );
    println!("{:-<64}", "");
    for model in &models {
        println!(
            "{:<8} {:<22} {:>8.2} {:<24}",
            format!("{}m", model.horizon),
            model.model_version.cyan(),
            model.mae,
            format_ts(Some(model.updated_at))
        );
    }
    Ok(())
}

fn print_status(status: &JobsStatus, console: &CliConsole) {
    console.print_header("Scheduled jobs");
    console.field("Timezone", &status.timezone);

    for job in &status.jobs {
        let snapshot = &job.snapshot;
        println!();
        println!("{}", snapshot.job_id.magenta().bold());
        console.field(
            "Last status",
            &snapshot
                .last_status
                .as_deref()
                .map(|s| status_label(s).to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        console.field("Last message", snapshot.last_message.as_deref().unwrap_or("-"));
        console.field("Last run", &format_ts(snapshot.last_run_ts));
        console.field("Last success", &format_ts(snapshot.last_success_ts));
        console.field("Next run", &format_ts(job.next_run_ts));
    }
}

/// Show tracked jobs
pub async fn status(ctx: &AppContext, console: &CliConsole) -> Result<()> {
    let status = ctx.scheduler()?.status().await?;
    print_status(&status, console);
    Ok(())
}

/// Run a tracked job now
pub async fn run(ctx: &AppContext, job_id: &str, console: &CliConsole) -> Result<()> {
    if tracked_job(job_id).is_none() {
        bail!(
            "Unknown job '{}' (expected daily-analysis or weekly-retrain)",
            job_id
        );
    }

    let outcome = ctx.scheduler()?.run_tracked(job_id).await?;
    if outcome.succeeded() {
        console.success(&format!("{}: {}", outcome.job_id, outcome.message));
        Ok(())
    } else {
        console.error(&format!("{}: {}", outcome.job_id, outcome.message));
        bail!("Job {} failed", outcome.job_id)
    }
}

/// Run scheduled jobs until Ctrl-C
pub async fn daemon(ctx: &AppContext, console: &CliConsole) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    print_status(&scheduler.status().await?, console);
    console.info("Press Ctrl-C to stop");

    scheduler
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await?;

    console.success("Scheduler stopped");
    Ok(())
}
