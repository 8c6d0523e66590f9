//! Datetime parsing and formatting for stored timestamps
//!
//! Timestamps are written as RFC 3339 text. Reads also accept SQLite's
//! `CURRENT_TIMESTAMP` format so rows touched by hand-written SQL still load.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected formats: RFC3339 (2023-01-01T12:00:00Z) or SQLite (2023-01-01 12:00:00)")]
    InvalidFormat { input: String },
}

/// Datetime parsing and formatting helpers
pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse RFC 3339 or SQLite-format (assumed UTC) datetimes
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive_formats = [
            "%Y-%m-%d %H:%M:%S",    // SQLite format
            "%Y-%m-%d %H:%M:%S%.f", // SQLite with microseconds
            "%Y-%m-%dT%H:%M:%S",    // ISO without timezone
        ];

        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Format for database storage
    pub fn format_for_storage(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_flexible_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            DateTimeParser::parse_flexible("2024-03-01T12:30:00Z").unwrap(),
            expected
        );
        assert_eq!(
            DateTimeParser::parse_flexible("2024-03-01 12:30:00").unwrap(),
            expected
        );
        assert!(DateTimeParser::parse_flexible("yesterday").is_err());
    }

    #[test]
    fn test_storage_format_round_trips() {
        let now = Utc::now();
        let stored = DateTimeParser::format_for_storage(&now);
        let parsed = DateTimeParser::parse_flexible(&stored).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
