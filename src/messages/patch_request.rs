//! PATCH request envelope.

use super::{PATCH_OP_URN, schemas_contain};
use crate::error::{ScimError, ScimResult};
use crate::patch::{PatchExecutor, PatchOpKind, PatchOperation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The RFC 7644 §3.5.2 PATCH request: an ordered list of operations
/// applied as a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations", alias = "operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    /// A request wrapping `operations`.
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_URN.to_string()],
            operations,
        }
    }

    /// Structural validation of the envelope and each operation.
    pub fn validate(&self) -> ScimResult<()> {
        if !schemas_contain(&self.schemas, PATCH_OP_URN) {
            return Err(ScimError::invalid_syntax(format!(
                "patch request schemas must contain '{PATCH_OP_URN}'"
            )));
        }
        if self.operations.is_empty() {
            return Err(ScimError::invalid_syntax(
                "patch request requires at least one operation",
            ));
        }
        for operation in &self.operations {
            match operation.op {
                PatchOpKind::Remove => {
                    if operation.path.is_none() {
                        return Err(ScimError::invalid_path(
                            "remove operation requires a path",
                        ));
                    }
                }
                PatchOpKind::Add | PatchOpKind::Replace => match &operation.value {
                    None => {
                        return Err(ScimError::invalid_value(format!(
                            "{} operation requires a value",
                            operation.op.as_str()
                        )));
                    }
                    Some(value) if value.as_object().is_some_and(Map::is_empty) => {
                        return Err(ScimError::invalid_value(format!(
                            "{} operation value must not be an empty object",
                            operation.op.as_str()
                        )));
                    }
                    Some(_) => {}
                },
            }
        }
        Ok(())
    }

    /// Validate and apply the request to `document` with default options.
    ///
    /// For schema-informed application (mutability, multi-valued shaping),
    /// pass the operations to a configured [`PatchExecutor`] instead.
    pub fn apply(&self, document: &Value) -> ScimResult<Value> {
        self.validate()?;
        PatchExecutor::new().apply(document, &self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_wire_round_trip() {
        let raw = json!({
            "schemas": [PATCH_OP_URN],
            "Operations": [
                {"op": "add", "path": "title", "value": "Boss"},
                {"op": "remove", "path": "emails[type eq \"work\"]"}
            ]
        });
        let request: PatchRequest = serde_json::from_value(raw).unwrap();
        request.validate().unwrap();
        assert_eq!(request.operations.len(), 2);

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["schemas"], json!([PATCH_OP_URN]));
        assert_eq!(back["Operations"][0]["op"], json!("add"));
    }

    #[test]
    fn test_wrong_schema_rejected() {
        let request = PatchRequest {
            schemas: vec!["urn:example:wrong".to_string()],
            operations: vec![PatchOperation::add(None, json!({"title": "Boss"}))],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_operation_invariants() {
        let missing_value = PatchRequest::new(vec![PatchOperation {
            op: PatchOpKind::Add,
            path: None,
            value: None,
        }]);
        assert!(matches!(
            missing_value.validate().unwrap_err(),
            ScimError::InvalidValue { .. }
        ));

        let empty_object = PatchRequest::new(vec![PatchOperation::replace(None, json!({}))]);
        assert!(empty_object.validate().is_err());

        let pathless_remove = PatchRequest::new(vec![PatchOperation {
            op: PatchOpKind::Remove,
            path: None,
            value: None,
        }]);
        assert!(matches!(
            pathless_remove.validate().unwrap_err(),
            ScimError::InvalidPath { .. }
        ));

        // An empty array is a legal value (it means "clear" on replace).
        let clear = PatchRequest::new(vec![PatchOperation::replace(
            Some(Path::from_str("emails").unwrap()),
            json!([]),
        )]);
        clear.validate().unwrap();
    }

    #[test]
    fn test_apply_is_transactional() {
        let request = PatchRequest::new(vec![
            PatchOperation::add(Some(Path::from_str("title").unwrap()), json!("Boss")),
            PatchOperation::replace(
                Some(Path::from_str("emails[type eq \"work\"]").unwrap()),
                json!({"value": "x@example.com"}),
            ),
        ]);
        let document = json!({"userName": "bjensen"});
        assert!(request.apply(&document).is_err());
        assert_eq!(document, json!({"userName": "bjensen"}));
    }
}
