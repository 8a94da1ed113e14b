//! Device sync commands

use anyhow::Result;
use glucopilot_store::PushBatch;
use std::path::Path;
use tracing::info;

use super::read_json;
use crate::console::CliConsole;
use crate::context::AppContext;

/// Print readings and events at or after `since`
pub async fn pull(ctx: &AppContext, since: i64, console: &CliConsole) -> Result<()> {
    let result = ctx.store.pull_since(since).await?;
    info!(
        since,
        glucose = result.glucose.len(),
        therapy_events = result.therapy_events.len(),
        next_since = result.next_since,
        "Sync pull"
    );
    console.json(&result)
}

/// Upload a batch file
pub async fn push(ctx: &AppContext, input: &Path, console: &CliConsole) -> Result<()> {
    let batch: PushBatch = read_json(input).await?;
    let result = ctx
        .store
        .push_sync(batch.glucose, batch.therapy_events)
        .await?;
    info!(
        accepted_glucose = result.accepted_glucose,
        accepted_therapy_events = result.accepted_therapy_events,
        "Sync push"
    );
    console.json(&result)
}
