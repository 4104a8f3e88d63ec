// src/utils/time.rs

//! Origin date-header parsing.
//!
//! The origin reports RFC-1123 style HTTP dates
//! (`"Tue, 25 Apr 2023 00:03:06 GMT"`). Parsing failures degrade to
//! `None`; callers fall back to the current wall-clock time.

use chrono::{DateTime, Utc};

/// Parse an HTTP date header value into a UTC timestamp.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional header value, if any.
pub fn parse_http_date_opt(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(parse_http_date)
}
