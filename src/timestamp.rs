// Conversion between stored/received timestamp strings and instants.
//
// Accepted on input:
// - RFC 3339 (`2023-08-15T10:00:00Z`), the canonical form written here
// - ISO-8601 with a space separator, with or without an offset
// - naive ISO-8601 (`2023-08-15T10:00:00`) and bare dates, read as UTC
// - HTTP-date (`Tue, 15 Aug 2023 10:00:00 GMT`), as sent in `Date` headers
//
// Output is always RFC 3339 in UTC with second precision.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const SPACED_WITH_OFFSET: &str = "%Y-%m-%d %H:%M:%S%.f%:z";
const SPACED_NAIVE: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse an HTTP-date as found in a `Date` response header.
pub fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, HTTP_DATE) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse any of the accepted stored forms.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, SPACED_WITH_OFFSET) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = s.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, SPACED_NAIVE) {
        return Some(naive.and_utc());
    }
    if let Ok(date) = s.parse::<NaiveDate>() {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    parse_http_date(s)
}

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
