//! Lenient timestamp decoding.
//!
//! The backend stores naive UTC datetimes, so timestamps arrive either as
//! RFC 3339 (`2025-03-01T18:30:00Z`) or without an offset
//! (`2025-03-01T18:30:00.123456`). Naive values are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses an RFC 3339 or offset-less ISO 8601 timestamp.
pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2025-03-01T18:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 16);
    }

    #[test]
    fn test_parse_naive_with_fraction() {
        let dt = parse("2025-03-01T18:30:00.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 18);
    }

    #[test]
    fn test_parse_naive_without_fraction() {
        assert!(parse("2025-03-01T18:30:00").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
