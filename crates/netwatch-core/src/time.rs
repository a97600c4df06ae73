//! Lenient parsing of the date formats providers emit.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive datetime layouts seen across WHOIS and feed providers.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S UTC",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a provider date into UTC.
///
/// Accepts RFC 3339, RFC 2822, the naive `YYYY-MM-DD HH:MM:SS` family and
/// bare `YYYY-MM-DD` dates (taken as midnight UTC). Returns `None` for
/// anything else, including placeholders like `"Unknown"`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Keep only the date part of an ISO timestamp (`2024-03-01T10:00:00Z` -> `2024-03-01`).
pub fn date_part(raw: &str) -> String {
    raw.split('T').next().unwrap_or(raw).to_string()
}
