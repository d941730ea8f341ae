//! Timestamp parsing and pt-BR display
//!
//! The backend serializes timestamps with Python's `isoformat()`, so values
//! may or may not carry fractional seconds or a UTC offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Display format used in every listing (`16/10/2026 14:05`)
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parse an ISO 8601 timestamp, with or without offset or time part
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a backend timestamp as `dd/mm/YYYY HH:MM`
///
/// Missing values render as `-`; unparseable ones are shown unchanged.
pub fn format_timestamp(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => "-".to_string(),
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}
