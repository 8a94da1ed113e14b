//! Telemetry and decision types shared across Glucopilot
//!
//! All wire types serialize in camelCase so they can be exchanged with the
//! client device as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One minute in milliseconds
pub const MINUTE_MS: i64 = 60 * 1000;

/// One hour in milliseconds
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

/// One day in milliseconds
pub const DAY_MS: i64 = 24 * HOUR_MS;

fn default_quality() -> String {
    "OK".to_string()
}

/// A single glucose measurement
///
/// Identity is `(ts, source)`: two sources may report the same instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseReading {
    /// Measurement time (unix milliseconds)
    pub ts: i64,

    /// Glucose value in mmol/L
    pub value_mmol: f64,

    /// Originating device or importer
    pub source: String,

    /// Sensor quality flag
    #[serde(default = "default_quality")]
    pub quality: String,
}

impl GlucoseReading {
    /// Create a reading with `OK` quality
    pub fn new(ts: i64, value_mmol: f64, source: impl Into<String>) -> Self {
        Self {
            ts,
            value_mmol,
            source: source.into(),
            quality: default_quality(),
        }
    }

    /// Identity key used for deduplication
    pub fn key(&self) -> (i64, String) {
        (self.ts, self.source.clone())
    }
}

/// A therapy event (bolus, carbs, temp target, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyEvent {
    /// Globally unique identifier
    pub id: String,

    /// Event time (unix milliseconds)
    pub ts: i64,

    /// Event type, e.g. `temp_target`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Free-form string attributes
    #[serde(default)]
    pub payload: BTreeMap<String, String>,
}

impl TherapyEvent {
    /// Create an event with an empty payload
    pub fn new(id: impl Into<String>, ts: i64, event_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ts,
            event_type: event_type.into(),
            payload: BTreeMap::new(),
        }
    }

    /// Add a payload attribute
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// A point forecast with a confidence band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Target time of the prediction (unix milliseconds)
    pub ts: i64,

    /// Lead time in minutes
    pub horizon: u32,

    /// Predicted glucose in mmol/L
    pub value_mmol: f64,

    /// Lower confidence bound
    pub ci_low: f64,

    /// Upper confidence bound
    pub ci_high: f64,

    /// Identifier of the producing model
    pub model_version: String,
}

/// Outcome of a rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleState {
    /// The rule fired
    Triggered,
    /// The rule fired but a safety policy vetoed it
    Blocked,
    /// The rule did not apply
    NoMatch,
}

impl RuleState {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleState::Triggered => "TRIGGERED",
            RuleState::Blocked => "BLOCKED",
            RuleState::NoMatch => "NO_MATCH",
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corrective action proposed by a triggered rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionProposal {
    /// Action kind, e.g. `temp_target`
    #[serde(rename = "type")]
    pub action_type: String,

    /// Target glucose in mmol/L
    pub target_mmol: f64,

    /// How long the action should last
    pub duration_minutes: u32,

    /// Machine-readable reason
    pub reason: String,
}

/// Decision returned by a rule evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDecision {
    pub rule_id: String,
    pub state: RuleState,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_proposal: Option<ActionProposal>,
}

impl RuleDecision {
    /// A NO_MATCH decision with a single reason
    pub fn no_match(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            state: RuleState::NoMatch,
            reasons: vec![reason.into()],
            action_proposal: None,
        }
    }

    /// A TRIGGERED decision carrying an action proposal
    pub fn triggered(
        rule_id: impl Into<String>,
        reason: impl Into<String>,
        proposal: ActionProposal,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            state: RuleState::Triggered,
            reasons: vec![reason.into()],
            action_proposal: Some(proposal),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.state == RuleState::Triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_wire_shape() {
        let json = r#"{"ts": 1710000000000, "valueMmol": 6.2, "source": "android"}"#;
        let reading: GlucoseReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.ts, 1_710_000_000_000);
        assert_eq!(reading.quality, "OK");
        assert_eq!(reading.key(), (1_710_000_000_000, "android".to_string()));
    }

    #[test]
    fn test_therapy_event_type_field() {
        let event = TherapyEvent::new("t-1", 5, "temp_target").with_payload("duration", "60");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "temp_target");
        assert_eq!(value["payload"]["duration"], "60");
    }

    #[test]
    fn test_rule_state_serialization() {
        assert_eq!(
            serde_json::to_string(&RuleState::NoMatch).unwrap(),
            "\"NO_MATCH\""
        );
        assert_eq!(RuleState::Triggered.to_string(), "TRIGGERED");
    }

    #[test]
    fn test_decision_omits_missing_proposal() {
        let decision = RuleDecision::no_match("r", "no_hypo");
        let json = serde_json::to_string(&decision).unwrap();

        assert!(json.contains("\"ruleId\":\"r\""));
        assert!(!json.contains("actionProposal"));
    }
}
