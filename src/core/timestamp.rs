//! Timestamp conversion for rendered lines
//!
//! Records carry fractional epoch seconds; the text layout shows them as
//! UTC ISO 8601 with millisecond precision (`2021-06-09T13:58:51.000`).

use chrono::{DateTime, Utc};

const TEXT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Convert fractional epoch seconds to a UTC datetime
///
/// Returns `None` for non-finite or out-of-range values.
#[must_use]
pub fn epoch_to_datetime(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    if !epoch_seconds.is_finite() {
        return None;
    }
    let secs = epoch_seconds.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    let nanos = ((epoch_seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Format for the text layout, falling back to the raw number when unrepresentable
#[must_use]
pub fn format_text(epoch_seconds: f64) -> String {
    match epoch_to_datetime(epoch_seconds) {
        Some(datetime) => datetime.format(TEXT_FORMAT).to_string(),
        None => epoch_seconds.to_string(),
    }
}
