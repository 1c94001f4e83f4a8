//! Lenient ISO-8601 date parsing for request bodies
//!
//! Clients send either a full RFC 3339 timestamp (`2025-02-10T00:00:00.000Z`)
//! or a bare calendar date from a date input (`2025-02-10`). Bare dates and
//! timestamps without an offset are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(format!("invalid date: {:?}", value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).map_err(serde::de::Error::custom)
}

/// Missing, `null` and empty strings all mean "not supplied".
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_datetime(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_datetime("2025-02-10T12:30:00.000Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 2, 10, 12, 30, 0).unwrap());

        let dt = parse_datetime("2025-02-10T12:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 2, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date_as_utc_midnight() {
        let dt = parse_datetime("2025-01-10").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_without_offset() {
        let dt = parse_datetime("2025-01-10T08:15:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 10, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_datetime("next tuesday").is_err());
        assert!(parse_datetime("2025-13-40").is_err());
    }

    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "deserialize")]
        due: DateTime<Utc>,
        #[serde(default, deserialize_with = "deserialize_option")]
        returned: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_optional_field_variants() {
        let p: Payload = serde_json::from_str(r#"{"due": "2025-02-10"}"#).unwrap();
        assert!(p.returned.is_none());
        assert_eq!(p.due, Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap());

        let p: Payload = serde_json::from_str(r#"{"due": "2025-02-10", "returned": null}"#).unwrap();
        assert!(p.returned.is_none());

        let p: Payload = serde_json::from_str(r#"{"due": "2025-02-10", "returned": ""}"#).unwrap();
        assert!(p.returned.is_none());

        let p: Payload =
            serde_json::from_str(r#"{"due": "2025-02-10", "returned": "2025-02-08"}"#).unwrap();
        assert_eq!(
            p.returned,
            Some(Utc.with_ymd_and_hms(2025, 2, 8, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_date_is_a_deserialize_error() {
        assert!(serde_json::from_str::<Payload>(r#"{"due": "soon"}"#).is_err());
    }
}
