//! Common `meta` attribute block.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Resource metadata per RFC 7643 §3.1.
///
/// The timestamps accept ISO 8601 strings with any offset, plus the legacy
/// Unix epoch-millis number form on input; serialization preserves the
/// offset each value was supplied with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(
        default,
        with = "crate::datetime::serde_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<FixedOffset>>,
    #[serde(
        default,
        with = "crate::datetime::serde_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Meta {
    /// A meta block for a resource of the given type.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::parse_datetime;
    use serde_json::json;

    #[test]
    fn test_legacy_epoch_millis_accepted() {
        let meta: Meta = serde_json::from_value(json!({
            "resourceType": "User",
            "created": 1201064182000i64,
            "lastModified": "2008-01-23T04:56:22Z"
        }))
        .unwrap();
        assert_eq!(meta.created, meta.last_modified);
        assert_eq!(
            meta.created.unwrap(),
            parse_datetime("2008-01-23T04:56:22Z").unwrap()
        );
    }

    #[test]
    fn test_serialization_preserves_offset() {
        let meta: Meta = serde_json::from_value(json!({
            "created": "2011-08-01T18:29:49-05:30"
        }))
        .unwrap();
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value, json!({"created": "2011-08-01T18:29:49-05:30"}));
    }

    #[test]
    fn test_invalid_datetime_rejected() {
        assert!(
            serde_json::from_value::<Meta>(json!({"created": "not-a-date"})).is_err()
        );
    }
}
