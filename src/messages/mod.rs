//! SCIM protocol messages.
//!
//! The request and response envelopes of RFC 7644 §3: list/query responses,
//! PATCH and search requests, bulk requests/responses, and the error
//! response. Each message validates that its `schemas` attribute carries
//! the URN the protocol assigns to it.

mod bulk;
mod error_response;
mod list_response;
mod patch_request;
mod search_request;

pub use bulk::{BulkMethod, BulkOperation, BulkOperationResult, BulkRequest, BulkResponse};
pub use error_response::ErrorResponse;
pub use list_response::ListResponse;
pub use patch_request::PatchRequest;
pub use search_request::{SearchRequest, SortOrder};

/// `schemas` URN of a list/query response.
pub const LIST_RESPONSE_URN: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
/// `schemas` URN of a PATCH request.
pub const PATCH_OP_URN: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
/// `schemas` URN of a search request.
pub const SEARCH_REQUEST_URN: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";
/// `schemas` URN of a bulk request.
pub const BULK_REQUEST_URN: &str = "urn:ietf:params:scim:api:messages:2.0:BulkRequest";
/// `schemas` URN of a bulk response.
pub const BULK_RESPONSE_URN: &str = "urn:ietf:params:scim:api:messages:2.0:BulkResponse";
/// `schemas` URN of an error response.
pub const ERROR_URN: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// Case-insensitive membership test for `schemas` arrays.
pub(crate) fn schemas_contain(schemas: &[String], urn: &str) -> bool {
    schemas.iter().any(|s| s.eq_ignore_ascii_case(urn))
}
