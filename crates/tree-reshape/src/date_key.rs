//! Normalisation of date axis values into range-store date keys.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y%m%dT%H%M%S"];
const DATE_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];

/// Parse a date or date-time in any of the accepted layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Date key for a raw value: `YYYY-MM-DDTHH:MM:SS` plus `suffix` when the
/// value parses, otherwise the value itself with `suffix` appended if missing.
pub fn date_key(raw: &str, suffix: &str) -> String {
    match parse_date(raw) {
        Some(dt) => format!("{}{}", dt.format(KEY_FORMAT), suffix),
        None if raw.ends_with(suffix) => raw.to_string(),
        None => format!("{}{}", raw, suffix),
    }
}
