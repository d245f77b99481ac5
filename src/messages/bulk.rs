//! Bulk request and response models.

use super::{BULK_REQUEST_URN, BULK_RESPONSE_URN, schemas_contain};
use crate::error::{ScimError, ScimResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// HTTP method of a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkMethod {
    #[serde(rename = "POST", alias = "post")]
    Post,
    #[serde(rename = "PUT", alias = "put")]
    Put,
    #[serde(rename = "PATCH", alias = "patch")]
    Patch,
    #[serde(rename = "DELETE", alias = "delete")]
    Delete,
}

impl BulkMethod {
    /// The wire keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkMethod::Post => "POST",
            BulkMethod::Put => "PUT",
            BulkMethod::Patch => "PATCH",
            BulkMethod::Delete => "DELETE",
        }
    }
}

/// One operation of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
    pub method: BulkMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl BulkOperation {
    /// A POST creating a resource, addressable by `bulk_id`.
    pub fn post(path: impl Into<String>, bulk_id: impl Into<String>, data: Value) -> Self {
        Self {
            method: BulkMethod::Post,
            path: path.into(),
            bulk_id: Some(bulk_id.into()),
            version: None,
            data: Some(data),
        }
    }

    /// A DELETE of the resource at `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: BulkMethod::Delete,
            path: path.into(),
            bulk_id: None,
            version: None,
            data: None,
        }
    }

    /// Per-operation invariants from RFC 7644 §3.7.
    pub fn validate(&self) -> ScimResult<()> {
        if self.bulk_id.is_some() && self.method != BulkMethod::Post {
            return Err(ScimError::invalid_syntax(format!(
                "bulkId is only legal on POST, not {}",
                self.method.as_str()
            )));
        }
        if self.method == BulkMethod::Post {
            if self.version.is_some() {
                return Err(ScimError::invalid_syntax("version is not legal on POST"));
            }
            if self.bulk_id.is_none() {
                return Err(ScimError::invalid_syntax("POST requires a bulkId"));
            }
        }
        match self.method {
            BulkMethod::Delete => {
                if self.data.is_some() {
                    return Err(ScimError::invalid_syntax("DELETE carries no data"));
                }
            }
            _ => {
                if self.data.is_none() {
                    return Err(ScimError::invalid_syntax(format!(
                        "{} requires data",
                        self.method.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The RFC 7644 §3.7 bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub schemas: Vec<String>,
    #[serde(
        rename = "failOnErrors",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fail_on_errors: Option<u32>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
    /// A request wrapping `operations`.
    pub fn new(operations: Vec<BulkOperation>) -> Self {
        Self {
            schemas: vec![BULK_REQUEST_URN.to_string()],
            fail_on_errors: None,
            operations,
        }
    }

    /// Envelope and per-operation validation.
    pub fn validate(&self) -> ScimResult<()> {
        if !schemas_contain(&self.schemas, BULK_REQUEST_URN) {
            return Err(ScimError::invalid_syntax(format!(
                "bulk request schemas must contain '{BULK_REQUEST_URN}'"
            )));
        }
        for operation in &self.operations {
            operation.validate()?;
        }
        Ok(())
    }
}

/// Outcome of one bulk operation.
///
/// `status` is an HTTP status code carried as a string; the deserializer
/// also accepts the nested `{"code": "201"}` form some providers emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub method: BulkMethod,
    #[serde(deserialize_with = "deserialize_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl BulkOperationResult {
    /// A successful result.
    pub fn success(method: BulkMethod, status: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            method,
            status: status.into(),
            location: Some(location.into()),
            response: None,
            bulk_id: None,
            version: None,
        }
    }

    /// A failed result carrying an error response body.
    ///
    /// A POST that failed before the resource was created must not carry a
    /// location, even when one was known; the bulkId is retained so the
    /// client can correlate.
    pub fn failure(
        method: BulkMethod,
        status: impl Into<String>,
        response: Value,
        location: Option<String>,
    ) -> Self {
        Self {
            method,
            status: status.into(),
            location: if method == BulkMethod::Post {
                None
            } else {
                location
            },
            response: Some(response),
            bulk_id: None,
            version: None,
        }
    }

    /// The numeric status code, when the status string is one.
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }

    /// Whether this result reports success (2xx).
    pub fn is_success(&self) -> bool {
        self.status_code().is_some_and(|code| (200..300).contains(&code))
    }

    /// Result invariants: non-POST results carry a location; a failed POST
    /// does not.
    pub fn validate(&self) -> ScimResult<()> {
        if self.method != BulkMethod::Post && self.location.is_none() {
            return Err(ScimError::invalid_syntax(format!(
                "{} result requires a location",
                self.method.as_str()
            )));
        }
        if self.method == BulkMethod::Post && !self.is_success() && self.location.is_some() {
            return Err(ScimError::invalid_syntax(
                "a failed POST result must not carry a location",
            ));
        }
        Ok(())
    }
}

/// `status` arrives as `"201"` or as the nested form `{"code": "201"}`;
/// anything else is rejected.
fn deserialize_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Object(obj) => match obj.get("code") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(D::Error::custom(
                "status object form requires a string 'code'",
            )),
        },
        other => Err(D::Error::custom(format!(
            "status must be a string or {{\"code\": ...}}, got {}",
            crate::value::type_name(&other)
        ))),
    }
}

/// The RFC 7644 §3.7 bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Vec<BulkOperationResult>,
}

impl BulkResponse {
    /// A response wrapping per-operation results.
    pub fn new(operations: Vec<BulkOperationResult>) -> Self {
        Self {
            schemas: vec![BULK_RESPONSE_URN.to_string()],
            operations,
        }
    }
}
