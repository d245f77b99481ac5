//! Schema registry mapping URNs to attribute definitions.
//!
//! The registry is read-only after construction and safe to share across
//! threads. It resolves dotted attribute paths (including schema-qualified
//! extension paths) to their [`AttributeDefinition`]s so the evaluator and
//! patch engine can honor `caseExact`, `mutability`, and `multiValued`.

use super::embedded;
use super::types::{AttributeDefinition, AttributeType, Mutability, Schema};
use crate::error::ScimResult;
use crate::path::Path;

/// Registry of SCIM schemas.
///
/// Ships with the RFC 7643 core User and Group schemas and the
/// EnterpriseUser extension embedded; additional schemas can be registered.
/// Lookup is case-insensitive throughout, and attribute resolution without a
/// schema URN searches schemas in registration order.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    /// Create a registry with the embedded core schemas.
    pub fn new() -> ScimResult<Self> {
        let mut registry = Self {
            schemas: Vec::new(),
        };
        registry.register(Self::load_schema_from_str(embedded::core_user_schema())?);
        registry.register(Self::load_schema_from_str(embedded::core_group_schema())?);
        registry.register(Self::load_schema_from_str(embedded::enterprise_user_schema())?);
        Ok(registry)
    }

    /// Create an empty registry (no embedded schemas).
    pub fn empty() -> Self {
        Self {
            schemas: Vec::new(),
        }
    }

    /// Parse a schema from a JSON string.
    fn load_schema_from_str(content: &str) -> ScimResult<Schema> {
        Ok(serde_json::from_str(content)?)
    }

    /// Register a schema, replacing any existing schema with the same id.
    pub fn register(&mut self, schema: Schema) {
        self.schemas
            .retain(|s| !s.id.eq_ignore_ascii_case(&schema.id));
        self.schemas.push(schema);
    }

    /// All registered schemas, in registration order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Look up a schema by case-insensitive URN.
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }

    /// Resolve an attribute definition by schema URN and dotted names.
    ///
    /// With a URN, only that schema is searched; without one, schemas are
    /// searched in registration order and the first top-level name match
    /// wins. Remaining names descend through sub-attribute definitions.
    pub fn resolve_names(&self, urn: Option<&str>, names: &[&str]) -> Option<&AttributeDefinition> {
        let (first, rest) = names.split_first()?;
        let top = match urn {
            Some(urn) => self.get_schema(urn)?.attribute(first),
            None => self.schemas.iter().find_map(|s| s.attribute(first)),
        }?;
        rest.iter()
            .try_fold(top, |attr, name| attr.sub_attribute(name))
    }

    /// Resolve the attribute definition a [`Path`] targets.
    ///
    /// Value filters on segments are ignored; only the attribute names
    /// matter for resolution. Returns `None` for the root path or when any
    /// segment is unknown to the registered schemas.
    pub fn resolve_attribute(&self, path: &Path) -> Option<&AttributeDefinition> {
        let names: Vec<&str> = path.segments().iter().map(|s| s.attribute()).collect();
        self.resolve_names(path.schema_urn(), &names)
    }

    /// Whether the attribute at `path` compares case-sensitively.
    ///
    /// Unknown attributes default to case-insensitive, per RFC 7643.
    pub fn case_exact(&self, path: &Path) -> bool {
        self.resolve_attribute(path)
            .map(|attr| attr.case_exact)
            .unwrap_or(false)
    }

    /// The declared type of the attribute at `path`, if known.
    pub fn attribute_type(&self, path: &Path) -> Option<AttributeType> {
        self.resolve_attribute(path).map(|attr| attr.data_type)
    }

    /// Whether a write to the attribute at `path` is forbidden.
    pub fn is_read_only(&self, path: &Path) -> bool {
        self.resolve_attribute(path)
            .map(|attr| attr.mutability == Mutability::ReadOnly)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_embedded_schemas_load() {
        let registry = SchemaRegistry::new().unwrap();
        assert!(
            registry
                .get_schema("urn:ietf:params:scim:schemas:core:2.0:User")
                .is_some()
        );
        assert!(
            registry
                .get_schema("URN:IETF:PARAMS:SCIM:SCHEMAS:CORE:2.0:GROUP")
                .is_some()
        );
    }

    #[test]
    fn test_resolve_sub_attribute() {
        let registry = SchemaRegistry::new().unwrap();
        let attr = registry.resolve_names(None, &["emails", "value"]).unwrap();
        assert_eq!(attr.name, "value");
        assert!(!attr.case_exact);

        let emails = registry.resolve_names(None, &["emails"]).unwrap();
        assert!(emails.is_complex() && emails.multi_valued);
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = SchemaRegistry::empty();
        assert!(registry.schemas().is_empty());
        assert!(registry.resolve_names(None, &["userName"]).is_none());
    }

    #[test]
    fn test_resolve_extension_attribute() {
        let registry = SchemaRegistry::new().unwrap();
        let attr = registry
            .resolve_names(
                Some("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"),
                &["manager", "displayName"],
            )
            .unwrap();
        assert_eq!(attr.mutability, Mutability::ReadOnly);
    }

    #[test]
    fn test_case_exact_lookup_by_path() {
        let registry = SchemaRegistry::new().unwrap();
        let id = Path::from_str("id").unwrap();
        assert!(registry.case_exact(&id));
        let user_name = Path::from_str("userName").unwrap();
        assert!(!registry.case_exact(&user_name));
        let unknown = Path::from_str("favoriteColor").unwrap();
        assert!(!registry.case_exact(&unknown));
    }

    #[test]
    fn test_read_only_detection() {
        let registry = SchemaRegistry::new().unwrap();
        assert!(registry.is_read_only(&Path::from_str("id").unwrap()));
        assert!(registry.is_read_only(&Path::from_str("meta.created").unwrap()));
        assert!(!registry.is_read_only(&Path::from_str("userName").unwrap()));
    }
}
