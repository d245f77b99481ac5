//! SCIM dateTime codec.
//!
//! Wire values are ISO 8601 with a `Z` or `±HH:MM` offset (minute-precision
//! offsets such as `+05:45` included) and optional fractional seconds.
//! Legacy producers emit Unix epoch milliseconds as a JSON number; those are
//! accepted on input only. Formatting preserves the offset the value was
//! supplied with.
//!
//! Parsing delegates to chrono's RFC 3339 parser, which provides full
//! semantic validation (no February 30th), correct offset handling, and
//! fractional-second support.

use crate::error::{ScimError, ScimResult};
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Parse a SCIM dateTime string.
pub fn parse_datetime(input: &str) -> ScimResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input)
        .map_err(|e| ScimError::invalid_value(format!("invalid dateTime '{input}': {e}")))
}

/// Parse a SCIM dateTime from a JSON value.
///
/// Strings are parsed as ISO 8601; numbers are accepted as legacy Unix
/// epoch milliseconds and carry a UTC offset.
pub fn datetime_from_value(value: &Value) -> ScimResult<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| {
                    ScimError::invalid_value(format!("invalid epoch-millis dateTime: {n}"))
                })?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| {
                    ScimError::invalid_value(format!("epoch-millis dateTime out of range: {millis}"))
                })
        }
        other => Err(ScimError::invalid_value(format!(
            "expected dateTime string, got {}",
            crate::value::type_name(other)
        ))),
    }
}

/// Format a dateTime for the wire, preserving its offset.
///
/// Fractional seconds are emitted at millisecond precision only when
/// present; a zero offset is written as `Z`.
pub fn format_datetime(value: &DateTime<FixedOffset>) -> String {
    if value.timestamp_subsec_millis() != 0 {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        value.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// True when both values parse as dateTimes denoting the same instant.
pub fn same_instant(a: &Value, b: &Value) -> bool {
    match (datetime_from_value(a), datetime_from_value(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// Serde adapter for optional dateTime fields that must accept the legacy
/// epoch-millis form and serialize with the offset preserved.
pub mod serde_optional {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&format_datetime(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(value) => datetime_from_value(&value)
                .map(Some)
                .map_err(|e| D::Error::custom(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offsets_equate_to_the_same_instant() {
        let a = parse_datetime("2025-03-09T01:59:45-06:00").unwrap();
        let b = parse_datetime("2025-03-09T07:59:45Z").unwrap();
        assert_eq!(a, b);
        assert!(same_instant(
            &json!("2025-03-09T01:59:45-06:00"),
            &json!("2025-03-09T07:59:45Z")
        ));
    }

    #[test]
    fn test_legacy_epoch_millis_input() {
        let legacy = datetime_from_value(&json!(1201064182000i64)).unwrap();
        let iso = parse_datetime("2008-01-23T04:56:22Z").unwrap();
        assert_eq!(legacy, iso);
    }

    #[test]
    fn test_fractional_hour_offsets() {
        let kathmandu = parse_datetime("2015-03-09T07:44:45+05:45").unwrap();
        let marquesas = parse_datetime("2015-03-08T16:29:45-09:30").unwrap();
        assert_eq!(kathmandu, marquesas);
    }

    #[test]
    fn test_format_preserves_offset() {
        let dt = parse_datetime("2015-03-09T01:59:45.123-06:00").unwrap();
        assert_eq!(format_datetime(&dt), "2015-03-09T01:59:45.123-06:00");

        let utc = parse_datetime("2015-03-09T07:59:45Z").unwrap();
        assert_eq!(format_datetime(&utc), "2015-03-09T07:59:45Z");
    }

    #[test]
    fn test_semantic_validation() {
        assert!(parse_datetime("2015-02-30T00:00:00Z").is_err());
        assert!(parse_datetime("not a date").is_err());
    }
}
