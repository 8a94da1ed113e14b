//! Action commands

use anyhow::Result;
use glucopilot_store::{ActionRecord, CopilotStore, TempTargetRequest};
use serde::Serialize;

use crate::console::CliConsole;
use crate::context::AppContext;

/// Message returned when an idempotency key was already used
pub const DUPLICATE_SUPPRESSED: &str = "duplicate_suppressed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}

impl From<ActionRecord> for ActionResponse {
    fn from(record: ActionRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            message: record.message,
        }
    }
}

/// Submit a temp target; a reused key answers with the original action
pub async fn submit_temp_target(
    store: &dyn CopilotStore,
    request: &TempTargetRequest,
) -> Result<ActionResponse> {
    let record = store.upsert_temp_target_action(request).await?;
    let duplicate = record.id != request.id;

    let mut response = ActionResponse::from(record);
    if duplicate {
        response.message = DUPLICATE_SUPPRESSED.to_string();
    }
    Ok(response)
}

pub async fn temp_target(
    ctx: &AppContext,
    request: TempTargetRequest,
    console: &CliConsole,
) -> Result<()> {
    let response = submit_temp_target(ctx.store.as_ref(), &request).await?;
    if response.message == DUPLICATE_SUPPRESSED {
        console.warn(&format!(
            "Idempotency key '{}' already used by action {}",
            request.idempotency_key, response.id
        ));
    }
    console.json(&response)
}

pub async fn show(ctx: &AppContext, id: &str, console: &CliConsole) -> Result<()> {
    let record = ctx.store.require_action(id).await?;
    console.json(&ActionResponse::from(record))
}
