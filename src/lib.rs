//! # SCIM 2.0 Data-Plane Core for Rust
//!
//! The data-plane of System for Cross-domain Identity Management (SCIM):
//! parsing, representing, mutating, evaluating, and serializing SCIM
//! resources and the messages that operate on them, per RFC 7643/7644.
//! Both sides of the protocol consume it: clients build requests and
//! interpret responses, service providers validate requests and mutate
//! stored resources.
//!
//! ## Features
//!
//! - Attribute path and filter grammars with round-trippable ASTs
//! - Schema-informed filter evaluation (caseExact, dateTime instants,
//!   decimal numerics)
//! - Full RFC 7644 PATCH semantics, including add-with-value-filter
//!   synthesis and transactional application
//! - A diff engine producing a minimal patch between two documents
//! - Bulk sequencing with `bulkId:` forward-reference resolution
//! - List/search/patch/bulk/error message envelopes with the protocol's
//!   wire quirks handled
//!
//! No transport, no storage: the crate is a pure, synchronous library over
//! `serde_json::Value` trees.
//!
//! ## Quick Start
//!
//! ```rust
//! use scim2_core::filter::{Filter, evaluate};
//! use scim2_core::messages::PatchRequest;
//! use scim2_core::diff::diff;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let user = json!({
//!         "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!         "userName": "bjensen",
//!         "addresses": [{"type": "home", "streetAddress": "8 Mile Rd."}]
//!     });
//!
//!     // Evaluate a filter against the resource.
//!     let filter: Filter = "addresses[type eq \"home\"]".parse()?;
//!     assert!(evaluate(&filter, &user));
//!
//!     // Apply a PATCH request.
//!     let request: PatchRequest = serde_json::from_value(json!({
//!         "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!         "Operations": [
//!             {"op": "add", "path": "addresses[type eq \"home\"].country", "value": "US"}
//!         ]
//!     }))?;
//!     let patched = request.apply(&user)?;
//!     assert_eq!(patched["addresses"][0]["country"], json!("US"));
//!
//!     // And derive the patch back from the two documents.
//!     let operations = diff(&user, &patched, true)?;
//!     assert_eq!(operations.len(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod bulk;
pub mod datetime;
pub mod diff;
pub mod error;
pub mod filter;
pub mod messages;
pub mod patch;
pub mod path;
pub mod query;
pub mod resource;
pub mod schema;
pub mod value;

// Core re-exports for library users
pub use bulk::{BulkHandler, execute_bulk};
pub use diff::diff;
pub use error::{ScimError, ScimResult, ScimType};
pub use filter::{Filter, FilterEvaluator, evaluate};
pub use messages::{
    BulkMethod, BulkOperation, BulkOperationResult, BulkRequest, BulkResponse, ErrorResponse,
    ListResponse, PatchRequest, SearchRequest,
};
pub use patch::{PatchExecutor, PatchOpKind, PatchOperation, PatchOptions};
pub use path::Path;
pub use query::{AttributeProjection, SortSpec, sort_resources};
pub use resource::{EnterpriseUser, Group, GroupMember, Meta, ScimResource, User};
pub use schema::{AttributeDefinition, AttributeType, Mutability, Schema, SchemaRegistry};
