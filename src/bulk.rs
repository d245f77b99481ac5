//! Bulk execution sequencing.
//!
//! The core owns the ordering contract of RFC 7644 §3.7; actually touching
//! storage is the caller's business. A [`BulkHandler`] executes one
//! operation at a time, and [`execute_bulk`] drives it in document order,
//! resolving `bulkId:` forward references as POSTs succeed and stopping
//! once `failOnErrors` is reached. Operations never issued are absent from
//! the response.

use crate::error::{ScimError, ScimResult};
use crate::messages::{
    BulkMethod, BulkOperation, BulkOperationResult, BulkRequest, BulkResponse, ErrorResponse,
};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;

/// Executes one bulk operation against the provider's store.
///
/// The result encodes failure through its `status`; the sequencer never
/// needs the handler to return an error.
pub trait BulkHandler {
    fn execute(&mut self, operation: &BulkOperation) -> BulkOperationResult;
}

impl<F> BulkHandler for F
where
    F: FnMut(&BulkOperation) -> BulkOperationResult,
{
    fn execute(&mut self, operation: &BulkOperation) -> BulkOperationResult {
        self(operation)
    }
}

/// Run a bulk request through `handler` in document order.
///
/// Envelope problems fail the whole request; operation failures are
/// reflected per-result. `bulkId:` references in paths and data resolve
/// against the locations earlier POSTs returned; an unresolved reference
/// fails that operation with `invalidValue` without invoking the handler.
pub fn execute_bulk<H: BulkHandler>(
    request: &BulkRequest,
    handler: &mut H,
) -> ScimResult<BulkResponse> {
    request.validate()?;

    let mut locations: HashMap<String, String> = HashMap::new();
    let mut results = Vec::with_capacity(request.operations.len());
    let mut failures: u32 = 0;

    for operation in &request.operations {
        if let Some(limit) = request.fail_on_errors
            && failures >= limit
        {
            debug!("failOnErrors={limit} reached, dropping remaining operations");
            break;
        }

        let resolved = match resolve_operation(operation, &locations) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(
                    "bulk {} {} has an unresolvable reference: {error}",
                    operation.method.as_str(),
                    operation.path
                );
                failures += 1;
                let mut result = BulkOperationResult::failure(
                    operation.method,
                    error.http_status().to_string(),
                    serde_json::to_value(ErrorResponse::from(&error))?,
                    Some(operation.path.clone()),
                );
                result.bulk_id = operation.bulk_id.clone();
                results.push(result);
                continue;
            }
        };

        let mut result = handler.execute(&resolved);
        if result.bulk_id.is_none() {
            result.bulk_id = operation.bulk_id.clone();
        }

        if result.is_success() {
            if operation.method == BulkMethod::Post
                && let (Some(bulk_id), Some(location)) = (&operation.bulk_id, &result.location)
            {
                debug!("bulkId:{bulk_id} resolved to {location}");
                locations.insert(bulk_id.clone(), location.clone());
            }
        } else {
            failures += 1;
        }
        results.push(result);
    }

    Ok(BulkResponse::new(results))
}

/// An operation with every `bulkId:` reference in its path and data
/// replaced by the location of the resource that POST created.
fn resolve_operation(
    operation: &BulkOperation,
    locations: &HashMap<String, String>,
) -> ScimResult<BulkOperation> {
    let mut resolved = operation.clone();
    resolved.path = resolve_text(&operation.path, locations)?;
    if let Some(data) = &operation.data {
        resolved.data = Some(resolve_value(data, locations)?);
    }
    Ok(resolved)
}

fn resolve_value(value: &Value, locations: &HashMap<String, String>) -> ScimResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(resolve_text(s, locations)?)),
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, locations))
                .collect::<ScimResult<_>>()?,
        )),
        Value::Object(obj) => {
            let mut out = serde_json::Map::new();
            for (k, v) in obj {
                out.insert(k.clone(), resolve_value(v, locations)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// Substitute each `bulkId:<id>` token in `text`.
fn resolve_text(text: &str, locations: &HashMap<String, String>) -> ScimResult<String> {
    const MARKER: &str = "bulkId:";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(pos) = find_marker(rest) else {
            out.push_str(rest);
            return Ok(out);
        };
        out.push_str(&rest[..pos]);
        rest = &rest[pos + MARKER.len()..];

        let id_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        let id = &rest[..id_len];
        if id.is_empty() {
            return Err(ScimError::invalid_value("empty bulkId reference"));
        }
        let location = locations.get(id).ok_or_else(|| {
            ScimError::invalid_value(format!("unresolved reference 'bulkId:{id}'"))
        })?;
        out.push_str(location);
        rest = &rest[id_len..];
    }
}

fn find_marker(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    lower.find("bulkid:")
}
