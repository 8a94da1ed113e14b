//! Matching forecasts to observed readings

use glucopilot_core::{GlucoseReading, MINUTE_MS};

/// Horizons up to this many minutes use the tight tolerance
const SHORT_HORIZON_MINUTES: u32 = 10;

/// Allowed distance between a forecast target and its matched reading
pub fn tolerance_ms(horizon: u32) -> i64 {
    if horizon <= SHORT_HORIZON_MINUTES {
        5 * MINUTE_MS
    } else {
        15 * MINUTE_MS
    }
}

/// Reading closest to `target_ts` within `tolerance_ms`
///
/// `readings` must be sorted by timestamp. Ties go to the earliest reading.
pub fn closest_reading(
    readings: &[GlucoseReading],
    target_ts: i64,
    tolerance_ms: i64,
) -> Option<&GlucoseReading> {
    let split = readings.partition_point(|r| r.ts < target_ts);

    let after = readings.get(split);
    let before = split.checked_sub(1).map(|last_before| {
        let ts = readings[last_before].ts;
        &readings[readings.partition_point(|r| r.ts < ts)]
    });

    let best = match (before, after) {
        (Some(b), Some(a)) if a.ts.abs_diff(target_ts) < target_ts.abs_diff(b.ts) => a,
        (Some(b), _) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    (best.ts.abs_diff(target_ts) <= tolerance_ms.unsigned_abs()).then_some(best)
}
