//! Maps the loosely-typed sheet onto RSVP records.
//!
//! Nothing here touches storage: functions take a [`Table`] and return
//! records or the cell writes needed to persist a change.

mod columns;
mod records;
mod table;

pub use columns::*;
pub use records::*;
pub use table::*;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Naive layouts accepted in timestamp cells, interpreted as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp cell; `None` for blank or unrecognized text.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = "2025-10-25T18:00:00.000Z";
        for input in [
            "2025-10-25T18:00:00Z",
            "2025-10-25T20:00:00+02:00",
            "2025-10-25 18:00:00",
            "10/25/2025 18:00:00",
        ] {
            let parsed = parse_timestamp(input).unwrap();
            assert_eq!(format_timestamp(parsed), expected, "input {}", input);
        }
        let date_only = parse_timestamp("2025-10-25").unwrap();
        assert_eq!(format_timestamp(date_only), "2025-10-25T00:00:00.000Z");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("next tuesday").is_none());
    }
}
