//! Lenient timestamp parsing for values coming off the wire.
//!
//! The license API is not strict about date encodings: records created by the
//! form carry full ISO timestamps, records edited inline carry plain dates and
//! older records may carry epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Placeholder shown wherever a value is missing or not displayable.
pub const SENTINEL: &str = "—";

/// Parse a wire timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC),
/// `YYYY-MM-DD` (midnight UTC) and integer milliseconds since the epoch.
/// Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }

    None
}

/// Render a timestamp as a calendar date, or the sentinel when absent.
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| SENTINEL.to_string())
}
