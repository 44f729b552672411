//! Lenient parsing of declared post dates.
//!
//! Authors write dates in a handful of shapes (`2023-01-01`,
//! `2023-01-01 10:30`, full RFC 3339). All of them are read as UTC instants so
//! that posts can be ordered and sitemap `lastmod` values rendered. Anything
//! else is treated as "no date".

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a declared date. Returns `None` for empty or unrecognized input.
pub fn parse(declared: &str) -> Option<DateTime<Utc>> {
    let declared = declared.trim();
    if declared.is_empty() {
        return None;
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(declared) {
        return Some(date_time.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(declared, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(declared, format).ok())
        .filter_map(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .next()
}

/// Renders a declared date as an ISO-8601 UTC timestamp with millisecond
/// precision (`2023-01-01T00:00:00.000Z`). Unparseable dates have no
/// timestamp.
pub fn iso8601(declared: &str) -> Option<String> {
    parse(declared).map(|date| date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        let midnight = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse("2023-01-01"), Some(midnight));
        assert_eq!(parse(" 2023/01/01 "), Some(midnight));
        assert_eq!(parse("2023-01-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse("2023-01-01T08:00:00+08:00"), Some(midnight));
        assert_eq!(
            parse("2023-01-01 10:30"),
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("2023-02-30"), None);
    }

    #[test]
    fn test_iso8601() {
        assert_eq!(
            iso8601("2023-01-01").as_deref(),
            Some("2023-01-01T00:00:00.000Z")
        );
        assert_eq!(iso8601("not a date"), None);
    }
}
