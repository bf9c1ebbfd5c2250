//! Tolerant date parsing for record timestamps.
//!
//! # Invariants
//! - Unparseable or missing input yields `None`, never an error.
//! - Naive inputs (no offset) are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Display format used when dates take part in free-text search.
pub const SEARCH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a raw date string into an instant.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Parses an optional raw date field.
pub fn parse_field(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_instant)
}

/// Sortable instant in epoch milliseconds; missing dates sort as the epoch.
pub fn sort_millis(instant: Option<DateTime<Utc>>) -> i64 {
    instant.map(|value| value.timestamp_millis()).unwrap_or(0)
}
