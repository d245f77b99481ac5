//! Bulk provisioning flow against an in-memory store.
//!
//! Drives the sequencer the way a service provider would: POSTs create
//! resources and later operations reference them through `bulkId:`.

use scim2_core::bulk::execute_bulk;
use scim2_core::messages::{
    BulkMethod, BulkOperation, BulkOperationResult, BulkRequest, ErrorResponse,
};
use scim2_core::{ScimError, ScimType};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Minimal in-memory store executing bulk operations.
struct InMemoryStore {
    resources: HashMap<String, Value>,
    next_id: u32,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            resources: HashMap::new(),
            next_id: 1,
        }
    }

    fn execute(&mut self, operation: &BulkOperation) -> BulkOperationResult {
        match operation.method {
            BulkMethod::Post => {
                let Some(data) = &operation.data else {
                    return error_result(operation, ScimError::invalid_value("missing data"));
                };
                let id = format!("{:04}", self.next_id);
                self.next_id += 1;
                let location = format!("https://example.com/v2{}/{id}", operation.path);
                self.resources.insert(location.clone(), data.clone());
                BulkOperationResult::success(BulkMethod::Post, "201", location)
            }
            BulkMethod::Put | BulkMethod::Patch => {
                let location = format!("https://example.com/v2{}", operation.path);
                match self.resources.get_mut(&location) {
                    Some(stored) => {
                        if let Some(data) = &operation.data {
                            *stored = data.clone();
                        }
                        BulkOperationResult::success(operation.method, "200", location)
                    }
                    None => error_result(
                        operation,
                        ScimError::no_target(format!("{} not found", operation.path)),
                    ),
                }
            }
            BulkMethod::Delete => {
                let location = format!("https://example.com/v2{}", operation.path);
                match self.resources.remove(&location) {
                    Some(_) => BulkOperationResult::success(BulkMethod::Delete, "204", location),
                    None => error_result(
                        operation,
                        ScimError::no_target(format!("{} not found", operation.path)),
                    ),
                }
            }
        }
    }
}

fn error_result(operation: &BulkOperation, error: ScimError) -> BulkOperationResult {
    BulkOperationResult::failure(
        operation.method,
        "404",
        serde_json::to_value(ErrorResponse::from(&error)).unwrap(),
        Some(operation.path.clone()),
    )
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn provisioning_flow_with_forward_references() {
    init_logging();
    let request: BulkRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:BulkRequest"],
        "Operations": [
            {
                "method": "POST",
                "path": "/Users",
                "bulkId": "qwerty",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "Alice"
                }
            },
            {
                "method": "POST",
                "path": "/Groups",
                "bulkId": "ytrewq",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
                    "displayName": "Tour Guides",
                    "members": [{"type": "User", "value": "bulkId:qwerty"}]
                }
            }
        ]
    }))
    .unwrap();

    let mut store = InMemoryStore::new();
    let response = execute_bulk(&request, &mut |op: &BulkOperation| store.execute(op)).unwrap();

    assert_eq!(response.operations.len(), 2);
    assert!(response.operations.iter().all(|r| r.is_success()));
    assert_eq!(
        response.operations[0].bulk_id.as_deref(),
        Some("qwerty"),
        "POST results retain their bulkId"
    );

    let group = store
        .resources
        .values()
        .find(|r| r["displayName"] == json!("Tour Guides"))
        .unwrap();
    assert_eq!(
        group["members"][0]["value"],
        json!("https://example.com/v2/Users/0001")
    );
}

#[test]
fn fail_on_errors_stops_the_batch() {
    init_logging();
    let request: BulkRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:BulkRequest"],
        "failOnErrors": 1,
        "Operations": [
            {"method": "DELETE", "path": "/Users/missing"},
            {"method": "POST", "path": "/Users", "bulkId": "a",
             "data": {"userName": "never-created"}}
        ]
    }))
    .unwrap();

    let mut store = InMemoryStore::new();
    let response = execute_bulk(&request, &mut |op: &BulkOperation| store.execute(op)).unwrap();

    assert_eq!(response.operations.len(), 1);
    assert_eq!(response.operations[0].status, "404");
    assert!(store.resources.is_empty());
}

#[test]
fn unresolved_reference_is_an_invalid_value_failure() {
    let request: BulkRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:BulkRequest"],
        "Operations": [
            {"method": "POST", "path": "/Groups", "bulkId": "g",
             "data": {"members": [{"value": "bulkId:ghost"}]}}
        ]
    }))
    .unwrap();

    let mut store = InMemoryStore::new();
    let response = execute_bulk(&request, &mut |op: &BulkOperation| store.execute(op)).unwrap();

    let result = &response.operations[0];
    assert_eq!(result.status, "400");
    assert!(result.location.is_none(), "failed POST carries no location");
    let body = result.response.as_ref().unwrap();
    assert_eq!(body["scimType"], json!(ScimType::InvalidValue.as_str()));
    assert!(store.resources.is_empty());
}
