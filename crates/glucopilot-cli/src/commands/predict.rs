//! One-off forecast and rule evaluation

use anyhow::Result;
use glucopilot_core::forecast::REASON_CODES;
use glucopilot_core::{
    Forecast, Forecaster, GlucoseReading, PostHypoReboundGuard, RuleDecision, RuleEvaluator,
    TrendForecaster,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use super::read_json;
use crate::console::CliConsole;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub forecasts: Vec<Forecast>,
    pub reason_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateRulesResponse {
    pub decisions: Vec<RuleDecision>,
}

pub fn predict_response(readings: &[GlucoseReading]) -> PredictResponse {
    PredictResponse {
        forecasts: TrendForecaster.forecast(readings),
        reason_codes: REASON_CODES.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn rules_response(readings: &[GlucoseReading]) -> EvaluateRulesResponse {
    EvaluateRulesResponse {
        decisions: vec![PostHypoReboundGuard.evaluate(readings)],
    }
}

/// Forecast from a readings file
pub async fn predict(input: &Path, console: &CliConsole) -> Result<()> {
    let readings: Vec<GlucoseReading> = read_json(input).await?;
    info!(readings = readings.len(), "Forecasting");
    console.json(&predict_response(&readings))
}

/// Evaluate the safety rule on a readings file
pub async fn rules(input: &Path, console: &CliConsole) -> Result<()> {
    let readings: Vec<GlucoseReading> = read_json(input).await?;
    let response = rules_response(&readings);
    for decision in &response.decisions {
        info!(rule = %decision.rule_id, state = decision.state.as_str(), "Rule evaluated");
    }
    console.json(&response)
}
