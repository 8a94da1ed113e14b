//! Safety rules evaluated over a glucose history
//!
//! Rules are single-shot: no state is carried between evaluations.

use crate::types::{ActionProposal, GlucoseReading, RuleDecision};

/// Identifier of the post-hypo rebound rule
pub const POST_HYPO_REBOUND_RULE_ID: &str = "PostHypoReboundGuard.v1";

/// Readings at or below this value count as hypoglycemic (mmol/L)
pub const HYPO_THRESHOLD_MMOL: f64 = 3.0;

/// Minimum rise between consecutive post-hypo readings (mmol/L)
pub const REBOUND_STEP_MMOL: f64 = 0.2;

const MIN_POINTS: usize = 4;
const MIN_POST_HYPO_POINTS: usize = 3;

/// Evaluates a safety rule against a glucose history
pub trait RuleEvaluator: Send + Sync {
    /// Stable rule identifier
    fn rule_id(&self) -> &str;

    /// Classify the readings; never produces BLOCKED on its own
    fn evaluate(&self, readings: &[GlucoseReading]) -> RuleDecision;
}

/// Detects a rising trend right after a hypoglycemic reading
#[derive(Debug, Clone, Copy, Default)]
pub struct PostHypoReboundGuard;

impl RuleEvaluator for PostHypoReboundGuard {
    fn rule_id(&self) -> &str {
        POST_HYPO_REBOUND_RULE_ID
    }

    fn evaluate(&self, readings: &[GlucoseReading]) -> RuleDecision {
        evaluate_post_hypo_rebound(readings)
    }
}

/// Evaluate the post-hypo rebound guard
pub fn evaluate_post_hypo_rebound(readings: &[GlucoseReading]) -> RuleDecision {
    if readings.len() < MIN_POINTS {
        return RuleDecision::no_match(POST_HYPO_REBOUND_RULE_ID, "insufficient_points");
    }

    let mut sorted = readings.to_vec();
    sorted.sort_by_key(|r| r.ts);

    let Some(hypo) = sorted
        .iter()
        .rev()
        .find(|r| r.value_mmol <= HYPO_THRESHOLD_MMOL)
    else {
        return RuleDecision::no_match(POST_HYPO_REBOUND_RULE_ID, "no_hypo");
    };

    let after: Vec<&GlucoseReading> = sorted.iter().filter(|r| r.ts > hypo.ts).collect();
    if after.len() < MIN_POST_HYPO_POINTS {
        return RuleDecision::no_match(POST_HYPO_REBOUND_RULE_ID, "insufficient_post_hypo_points");
    }

    let rising = after[1].value_mmol - after[0].value_mmol > REBOUND_STEP_MMOL
        && after[2].value_mmol - after[1].value_mmol > REBOUND_STEP_MMOL;
    if !rising {
        return RuleDecision::no_match(POST_HYPO_REBOUND_RULE_ID, "no_rebound");
    }

    RuleDecision::triggered(
        POST_HYPO_REBOUND_RULE_ID,
        "hypo_plus_rising_trend",
        ActionProposal {
            action_type: "temp_target".to_string(),
            target_mmol: 4.4,
            duration_minutes: 60,
            reason: "post_hypo_rebound".to_string(),
        },
    )
}
