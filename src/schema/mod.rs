//! Schema catalog for SCIM resources.
//!
//! This module provides the attribute-definition model of RFC 7643 §2 and a
//! registry mapping schema URNs to definitions. The path walker, filter
//! evaluator, and patch engine consult the registry for case-exactness,
//! mutability, and multi-valued characteristics; everything degrades to
//! schemaless defaults when no registry is supplied.
//!
//! ## Organization
//!
//! - [`types`] - Core schema data structures (Schema, AttributeDefinition, etc.)
//! - [`registry`] - Registry holding registered schemas, with the RFC 7643
//!   core User/Group schemas and the EnterpriseUser extension embedded
//!
//! ## Usage
//!
//! ```rust
//! use scim2_core::schema::SchemaRegistry;
//! use scim2_core::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//!
//! let path: Path = "userName".parse()?;
//! let definition = registry.resolve_attribute(&path).unwrap();
//! assert!(!definition.case_exact);
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod types;

// Re-export the main types for convenience
pub use registry::SchemaRegistry;
pub use types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema, Uniqueness};
