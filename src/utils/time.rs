//! Timestamp formatting helpers for CLI output

use chrono::{DateTime, SecondsFormat};

/// Render epoch seconds as RFC 3339, or "never" for 0
pub fn format_timestamp(epoch_secs: f64) -> String {
    if epoch_secs == 0.0 {
        return "never".to_string();
    }

    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1e9).round().min(999_999_999.0) as u32;

    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => format!("{epoch_secs:e} (out of range)"),
    }
}

/// Beyond this an hour count no longer fits a minute count in `i64`
const MAX_FORMATTED_HOURS: f64 = 1e12;

/// Render an hour count as e.g. "3h 20m"
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours.abs() > MAX_FORMATTED_HOURS {
        return format!("{hours:.3e}h");
    }

    let total_minutes = (hours * 60.0).round() as i64;
    let sign = if total_minutes < 0 { "-" } else { "" };
    let total_minutes = total_minutes.unsigned_abs();

    format!("{sign}{}h {:02}m", total_minutes / 60, total_minutes % 60)
}
