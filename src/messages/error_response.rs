//! Error response envelope.

use super::ERROR_URN;
use crate::error::{ScimError, ScimType};
use serde::{Deserialize, Serialize};

/// The RFC 7644 §3.12 error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub schemas: Vec<String>,
    /// HTTP status code, carried as a string on the wire
    pub status: String,
    #[serde(
        rename = "scimType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scim_type: Option<ScimType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    /// An error response with the given HTTP status.
    pub fn new(status: u16) -> Self {
        Self {
            schemas: vec![ERROR_URN.to_string()],
            status: status.to_string(),
            scim_type: None,
            detail: None,
        }
    }

    /// Attach the RFC 7644 error keyword.
    pub fn with_scim_type(mut self, scim_type: ScimType) -> Self {
        self.scim_type = Some(scim_type);
        self
    }

    /// Attach a human-readable detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<&ScimError> for ErrorResponse {
    fn from(error: &ScimError) -> Self {
        ErrorResponse::new(error.http_status())
            .with_scim_type(error.scim_type())
            .with_detail(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_scim_error() {
        let error = ScimError::no_target("path 'emails[type eq \"work\"]' matched nothing");
        let response = ErrorResponse::from(&error);
        assert_eq!(response.status, "400");
        assert_eq!(response.scim_type, Some(ScimType::NoTarget));
        assert!(response.detail.unwrap().contains("matched nothing"));
    }

    #[test]
    fn test_wire_shape() {
        let response = ErrorResponse::new(409)
            .with_scim_type(ScimType::Uniqueness)
            .with_detail("userName already taken");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["schemas"], json!([ERROR_URN]));
        assert_eq!(value["status"], json!("409"));
        assert_eq!(value["scimType"], json!("uniqueness"));
    }

    #[test]
    fn test_round_trip() {
        let raw = json!({
            "schemas": [ERROR_URN],
            "status": "400",
            "scimType": "invalidFilter",
            "detail": "bad filter"
        });
        let response: ErrorResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(response.scim_type, Some(ScimType::InvalidFilter));
        assert_eq!(serde_json::to_value(&response).unwrap(), raw);
    }
}
