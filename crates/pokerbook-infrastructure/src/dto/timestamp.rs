//! Timestamp (de)serialization.
//!
//! Written as RFC 3339 in UTC. Read from RFC 3339, from naive ISO 8601
//! date-times (taken as UTC), or from a bare `YYYY-MM-DD` date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
}

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Same as the parent module, for optional fields.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse("2024-02-09T22:15:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 9, 21, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_isoformat() {
        let parsed = parse("2024-02-09T21:15:00.123456").unwrap();
        assert_eq!(parsed.hour(), 21);
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_bare_date() {
        let parsed = parse("2024-02-09").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 2, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("last friday").is_none());
    }
}
