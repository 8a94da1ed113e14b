//! JSON report generation

use anyhow::Result;

use crate::metrics::ReplayReport;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(report: &ReplayReport) -> Result<String> {
        let json = serde_json::to_string_pretty(report)?;
        Ok(json)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(report: &ReplayReport) -> Result<String> {
        let json = serde_json::to_string(report)?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_generation() {
        let report = ReplayReport::insufficient(10, 20, 5, "PostHypoReboundGuard.v1");
        let json = JsonReporter::generate(&report).unwrap();

        assert!(json.contains("\"forecastStats\": []"));
        assert!(json.contains("\"ruleId\": \"PostHypoReboundGuard.v1\""));

        let parsed: ReplayReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_compact_json() {
        let report = ReplayReport::insufficient(10, 20, 5, "r");
        let json = JsonReporter::generate_compact(&report).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"since\":10,\"until\":20,\"points\":5"));
    }
}
