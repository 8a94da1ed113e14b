//! Error collector for replay runs
//!
//! Gathers scored forecasts per horizon and rule outcomes while the replay
//! loop walks through the data.

use std::collections::BTreeMap;

use glucopilot_core::RuleState;

use super::types::{ErrorSample, RuleStats};

/// Collector for gathering samples during a replay
#[derive(Debug, Clone)]
pub struct ErrorCollector {
    /// Samples keyed by horizon, in collection order
    samples: BTreeMap<u32, Vec<ErrorSample>>,

    /// Outcome tally of the evaluated rule
    rule_stats: RuleStats,
}

impl ErrorCollector {
    /// Create a collector for one rule
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            samples: BTreeMap::new(),
            rule_stats: RuleStats::new(rule_id),
        }
    }

    /// Record a scored forecast
    pub fn record_sample(&mut self, sample: ErrorSample) {
        self.samples.entry(sample.horizon).or_default().push(sample);
    }

    /// Record a rule decision
    pub fn record_decision(&mut self, state: RuleState) {
        self.rule_stats.record(state);
    }

    /// Horizons with at least one sample, ascending
    pub fn horizons(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.keys().copied()
    }

    /// Samples of a horizon in collection order
    pub fn samples(&self, horizon: u32) -> &[ErrorSample] {
        self.samples
            .get(&horizon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All samples grouped by horizon
    pub fn by_horizon(&self) -> &BTreeMap<u32, Vec<ErrorSample>> {
        &self.samples
    }

    /// Total number of samples across horizons
    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    pub fn rule_stats(&self) -> &RuleStats {
        &self.rule_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glucopilot_core::GlucoseReading;

    #[test]
    fn test_groups_by_horizon() {
        let mut collector = ErrorCollector::new("rule");
        let actual = GlucoseReading::new(0, 6.0, "cgm");
        collector.record_sample(ErrorSample::score(60, 5.0, &actual));
        collector.record_sample(ErrorSample::score(5, 5.5, &actual));
        collector.record_sample(ErrorSample::score(5, 6.5, &actual));

        assert_eq!(collector.horizons().collect::<Vec<_>>(), vec![5, 60]);
        assert_eq!(collector.samples(5).len(), 2);
        assert_eq!(collector.samples(60).len(), 1);
        assert!(collector.samples(30).is_empty());
        assert_eq!(collector.sample_count(), 3);
    }

    #[test]
    fn test_tallies_rule_outcomes() {
        let mut collector = ErrorCollector::new("rule");
        collector.record_decision(RuleState::NoMatch);
        collector.record_decision(RuleState::Triggered);

        let stats = collector.rule_stats();
        assert_eq!(stats.rule_id, "rule");
        assert_eq!(stats.triggered, 1);
        assert_eq!(stats.no_match, 1);
        assert_eq!(stats.blocked, 0);
    }
}
