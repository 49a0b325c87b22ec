//! Timestamp encoding for the SQLite store and parsing of caller input.
//!
//! Every timestamp is persisted as fixed-width RFC 3339 UTC text with
//! microsecond precision, e.g. `2026-10-17T09:30:00.000000Z`. Fixed width
//! means lexical order equals chronological order, so `scheduled_time <= ?`
//! comparisons in SQL are correct without any date functions.

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc,
};

/// Years whose encoding is four unsigned digits. Anything outside would
/// gain a sign or a fifth digit and break lexical ordering.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Naive formats accepted from callers (interpreted as UTC). Covers the
/// output of HTML `datetime-local` inputs, which carry no offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Current instant truncated to the stored precision.
///
/// Values returned to callers must equal what a later read yields, so all
/// writes go through this rather than `Utc::now()` directly.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Encode for storage.
pub fn encode(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored value.
pub fn decode(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 with any offset, naive date-times (taken as UTC) and bare
/// dates (midnight UTC). Returns `None` for anything else, including instants
/// whose UTC year falls outside `0000..=9999`. Surrounding whitespace is
/// ignored; an empty string is not a timestamp.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    parse_any(input.trim()).filter(|dt| STORABLE_YEARS.contains(&dt.year()))
}

fn parse_any(input: &str) -> Option<DateTime<Utc>> {
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).trunc_subsecs(6));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&naive).trunc_subsecs(6));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
