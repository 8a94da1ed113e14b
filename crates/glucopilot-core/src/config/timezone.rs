//! Timezone labels accepted by the scheduler

use crate::error::{CopilotError, CopilotResult};
use chrono::{FixedOffset, Offset, Utc};

/// Parse `UTC`, `Z` or a `+HH:MM` / `-HH:MM` offset
pub fn parse_timezone(label: &str) -> CopilotResult<FixedOffset> {
    let label = label.trim();
    if label.eq_ignore_ascii_case("utc") || label == "Z" {
        return Ok(Utc.fix());
    }

    let invalid = || CopilotError::config(format!("Unsupported timezone: '{}'", label));

    let (sign, rest) = match label.as_bytes().first() {
        Some(b'+') => (1, &label[1..]),
        Some(b'-') => (-1, &label[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
