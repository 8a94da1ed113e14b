//! Replay engine
//!
//! Walks a historical glucose series as if it were arriving live, forecasting
//! and evaluating the safety rule at each simulated step, then scores the
//! forecasts against what was actually observed.

use glucopilot_core::{
    DAY_MS, Forecaster, GlucoseReading, PostHypoReboundGuard, RuleEvaluator, TherapyEvent,
    TrendForecaster,
};
use tracing::{debug, debug_span, trace};

use super::matcher::{closest_reading, tolerance_ms};
use crate::metrics::{ErrorCollector, ErrorSample, ReplayReport, StatisticsAggregator};

/// Fewer filtered readings than this skip the simulation
pub const MIN_REPLAY_POINTS: usize = 30;

/// Index of the first simulated step
pub const WARMUP_READINGS: usize = 24;

/// Readings before the current one included in each step's history
pub const GLUCOSE_WINDOW_READINGS: usize = 72;

/// Look-back of the therapy window
pub const THERAPY_WINDOW_MS: i64 = DAY_MS;

/// Nominal CGM cadence the step is expressed against
const CADENCE_MINUTES: u32 = 5;

/// Number of readings to advance per simulated step
pub fn stride_for(step_minutes: u32) -> usize {
    (step_minutes.max(1) / CADENCE_MINUTES).max(1) as usize
}

/// Replay engine for a forecaster and a rule
pub struct ReplayEngine<F = TrendForecaster, R = PostHypoReboundGuard> {
    forecaster: F,
    rule: R,
    aggregator: StatisticsAggregator,
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(TrendForecaster, PostHypoReboundGuard)
    }
}

impl<F: Forecaster, R: RuleEvaluator> ReplayEngine<F, R> {
    /// Create an engine around a forecaster and a rule
    pub fn new(forecaster: F, rule: R) -> Self {
        Self {
            forecaster,
            rule,
            aggregator: StatisticsAggregator::new(),
        }
    }

    /// Replay `[since, until]` and report accuracy and rule outcomes
    pub fn run(
        &self,
        glucose: &[GlucoseReading],
        therapy: &[TherapyEvent],
        since: i64,
        until: i64,
        step_minutes: u32,
    ) -> ReplayReport {
        let points = filter_sorted(glucose, since, until, |r| r.ts);
        let events = filter_sorted(therapy, since, until, |e| e.ts);

        let stride = stride_for(step_minutes);
        let _span = debug_span!("replay", points = points.len(), stride).entered();

        if points.len() < MIN_REPLAY_POINTS {
            debug!(
                min = MIN_REPLAY_POINTS,
                "Not enough readings to replay; returning empty report"
            );
            return ReplayReport::insufficient(since, until, points.len(), self.rule.rule_id());
        }

        let mut collector = ErrorCollector::new(self.rule.rule_id());
        let mut steps = 0usize;

        for i in (WARMUP_READINGS..points.len()).step_by(stride) {
            let now = &points[i];
            let window = &points[i.saturating_sub(GLUCOSE_WINDOW_READINGS)..=i];
            let therapy_window = therapy_window(&events, now.ts);
            trace!(
                now = now.ts,
                glucose = window.len(),
                therapy = therapy_window.len(),
                "Simulating step"
            );

            for forecast in self.forecaster.forecast(window) {
                let Some(actual) =
                    closest_reading(&points, forecast.ts, tolerance_ms(forecast.horizon))
                else {
                    continue;
                };
                collector.record_sample(ErrorSample::score(
                    forecast.horizon,
                    forecast.value_mmol,
                    actual,
                ));
            }

            collector.record_decision(self.rule.evaluate(window).state);
            steps += 1;
        }

        debug!(
            steps,
            samples = collector.sample_count(),
            "Replay simulation finished"
        );

        self.aggregator
            .aggregate(since, until, points.len(), &collector)
    }
}

/// Replay with the trend forecaster and post-hypo rebound guard
pub fn build_replay_report(
    glucose: &[GlucoseReading],
    therapy: &[TherapyEvent],
    since: i64,
    until: i64,
    step_minutes: u32,
) -> ReplayReport {
    let engine: ReplayEngine = ReplayEngine::default();
    engine.run(glucose, therapy, since, until, step_minutes)
}

/// Items inside `[since, until]`, stably sorted by timestamp
fn filter_sorted<T: Clone>(
    items: &[T],
    since: i64,
    until: i64,
    ts: impl Fn(&T) -> i64,
) -> Vec<T> {
    let mut kept: Vec<T> = items
        .iter()
        .filter(|item| (since..=until).contains(&ts(*item)))
        .cloned()
        .collect();
    kept.sort_by_key(|item| ts(item));
    kept
}

/// Events in `[now - 24h, now]`; `events` must be sorted
fn therapy_window(events: &[TherapyEvent], now: i64) -> &[TherapyEvent] {
    let start = events.partition_point(|e| e.ts < now.saturating_sub(THERAPY_WINDOW_MS));
    let end = events.partition_point(|e| e.ts <= now);
    &events[start..end.max(start)]
}
