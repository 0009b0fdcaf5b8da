//! Permissive date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::Value;

// Cheap shape check before trying every format: a date needs a
// 1-4 digit group followed by a separator or a month name.
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,4}[-/. ]|[a-z]{3,9}\.? \d{1,2},? \d{4})")
        .expect("date shape pattern is valid")
});

/// Date-only formats, tried in order. Month-first wins for ambiguous
/// `NN/NN/YYYY` values.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time formats; the time of day is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Parse a string as a calendar date, or `None` when no format fits.
///
/// Never substitutes a default (epoch, zero) for unparseable input.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() < 6 || !DATE_SHAPE.is_match(trimmed) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Interpret a typed cell as a date: dates pass, text is parsed.
pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => parse_date(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_and_slashes() {
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("01/05/2024"), Some(ymd(2024, 1, 5)));
        // Day > 12 can only be day-first
        assert_eq!(parse_date("25/01/2024"), Some(ymd(2024, 1, 25)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_date("05-Jan-2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("5 January 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_datetimes_drop_time() {
        assert_eq!(parse_date("2024-01-05 13:45:00"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T13:45:00Z"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_rejects_non_dates() {
        assert_eq!(parse_date("Acme"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("12"), None);
    }
}
