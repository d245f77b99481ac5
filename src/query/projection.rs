//! Attribute projection per RFC 7644 §3.4.2.5.
//!
//! `attributes` narrows a response to the requested set; `excludedAttributes`
//! drops attributes from the default set. Either way, `schemas` and `id`
//! and anything the schema declares as `returned: always` stay, and
//! `returned: never` attributes (passwords) are stripped when a registry is
//! supplied.

use crate::error::ScimResult;
use crate::path::Path;
use crate::schema::{Returned, SchemaRegistry};
use serde_json::{Map, Value};

/// Which attributes of a resource to return.
#[derive(Debug, Clone, Default)]
pub struct AttributeProjection {
    attributes: Vec<Path>,
    excluded_attributes: Vec<Path>,
}

impl AttributeProjection {
    /// Return only the named attributes (plus the always-returned set).
    pub fn including(attributes: Vec<Path>) -> Self {
        Self {
            attributes,
            excluded_attributes: Vec::new(),
        }
    }

    /// Return the default set minus the named attributes.
    pub fn excluding(excluded_attributes: Vec<Path>) -> Self {
        Self {
            attributes: Vec::new(),
            excluded_attributes,
        }
    }

    /// Parse the comma-separated `attributes` / `excludedAttributes` query
    /// parameters. When `attributes` is present it wins, per the RFC.
    pub fn from_params(
        attributes: Option<&str>,
        excluded_attributes: Option<&str>,
    ) -> ScimResult<Self> {
        Ok(Self {
            attributes: parse_list(attributes)?,
            excluded_attributes: parse_list(excluded_attributes)?,
        })
    }

    /// True when nothing is requested and nothing is excluded.
    pub fn is_default(&self) -> bool {
        self.attributes.is_empty() && self.excluded_attributes.is_empty()
    }

    /// Project a resource document.
    ///
    /// Null-valued attributes are dropped along the way; the input is left
    /// untouched.
    pub fn apply(&self, resource: &Value, registry: Option<&SchemaRegistry>) -> Value {
        let Some(obj) = resource.as_object() else {
            return resource.clone();
        };
        Value::Object(self.project_object(obj, None, registry))
    }

    fn project_object(
        &self,
        obj: &Map<String, Value>,
        urn: Option<&str>,
        registry: Option<&SchemaRegistry>,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in obj {
            if value.is_null() {
                continue;
            }
            // Extension objects are projected through their URN-qualified
            // attribute paths.
            if urn.is_none() && key.to_ascii_lowercase().starts_with("urn:") {
                if let Some(extension) = value.as_object() {
                    let projected = self.project_object(extension, Some(key), registry);
                    if !projected.is_empty() {
                        out.insert(key.clone(), Value::Object(projected));
                    }
                    continue;
                }
            }

            match self.decide(key, urn, registry) {
                Decision::Drop => {}
                Decision::Keep => {
                    out.insert(key.clone(), value.clone());
                }
                Decision::Narrow(subs) => {
                    let narrowed = narrow(value, &subs);
                    if !narrowed.is_null() {
                        out.insert(key.clone(), narrowed);
                    }
                }
            }
        }
        out
    }

    fn decide(&self, key: &str, urn: Option<&str>, registry: Option<&SchemaRegistry>) -> Decision {
        // schemas and id are always returned.
        if urn.is_none() && (key.eq_ignore_ascii_case("schemas") || key.eq_ignore_ascii_case("id")) {
            return Decision::Keep;
        }

        let returned = registry
            .and_then(|r| r.resolve_names(urn, &[key]))
            .map(|attr| attr.returned);
        match returned {
            Some(Returned::Never) => return Decision::Drop,
            Some(Returned::Always) => return Decision::Keep,
            _ => {}
        }

        if !self.attributes.is_empty() {
            let requested: Vec<&Path> = self
                .attributes
                .iter()
                .filter(|p| matches_attribute(p, key, urn))
                .collect();
            if requested.is_empty() {
                // `returned: request` attributes only come back when asked for.
                return Decision::Drop;
            }
            let subs: Vec<String> = requested
                .iter()
                .filter_map(|p| p.segments().get(1))
                .map(|s| s.attribute().to_string())
                .collect();
            if requested.iter().any(|p| p.segments().len() == 1) || subs.is_empty() {
                return Decision::Keep;
            }
            return Decision::Narrow(subs);
        }

        if matches!(returned, Some(Returned::Request)) {
            return Decision::Drop;
        }
        if self
            .excluded_attributes
            .iter()
            .any(|p| matches_attribute(p, key, urn) && p.segments().len() == 1)
        {
            return Decision::Drop;
        }
        Decision::Keep
    }
}

enum Decision {
    Keep,
    Drop,
    /// Keep only the named sub-attributes of a complex value
    Narrow(Vec<String>),
}

fn parse_list(raw: Option<&str>) -> ScimResult<Vec<Path>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Whether a requested path names the attribute `key` (in the extension
/// `urn` when set).
fn matches_attribute(path: &Path, key: &str, urn: Option<&str>) -> bool {
    let urn_matches = match (path.schema_urn(), urn) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, _) => true,
        (Some(_), None) => false,
    };
    urn_matches
        && path
            .segments()
            .first()
            .is_some_and(|s| s.attribute().eq_ignore_ascii_case(key))
}

/// Keep only `subs` of a complex value; elements of a multi-valued
/// attribute are narrowed one by one.
fn narrow(value: &Value, subs: &[String]) -> Value {
    match value {
        Value::Object(obj) => {
            let kept: Map<String, Value> = obj
                .iter()
                .filter(|(k, _)| subs.iter().any(|s| s.eq_ignore_ascii_case(k)))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if kept.is_empty() {
                Value::Null
            } else {
                Value::Object(kept)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| narrow(item, subs))
                .filter(|item| !item.is_null())
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223",
            "userName": "bjensen",
            "title": "Tour Guide",
            "password": "t1meMa$heen",
            "name": {"givenName": "Barbara", "familyName": "Jensen"},
            "emails": [
                {"value": "bjensen@example.com", "type": "work"},
                {"value": "babs@jensen.org", "type": "home"}
            ],
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "department": "Tour Operations",
                "costCenter": "4130"
            }
        })
    }

    #[test]
    fn test_default_projection_keeps_everything() {
        let projection = AttributeProjection::default();
        assert!(projection.is_default());
        let projected = projection.apply(&user(), None);
        assert_eq!(projected["title"], json!("Tour Guide"));
        assert_eq!(projected["name"]["givenName"], json!("Barbara"));
    }

    #[test]
    fn test_registry_strips_never_returned() {
        let registry = SchemaRegistry::new().unwrap();
        let projected = AttributeProjection::default().apply(&user(), Some(&registry));
        assert!(projected.get("password").is_none());
        assert_eq!(projected["userName"], json!("bjensen"));
    }

    #[test]
    fn test_attributes_narrow_the_response() {
        let projection =
            AttributeProjection::from_params(Some("userName,emails.value"), None).unwrap();
        let projected = projection.apply(&user(), None);
        // Requested attributes plus the always-returned core.
        assert_eq!(projected["userName"], json!("bjensen"));
        assert_eq!(projected["id"], json!("2819c223"));
        assert!(projected.get("title").is_none());
        assert!(projected.get("name").is_none());
        assert_eq!(
            projected["emails"],
            json!([{"value": "bjensen@example.com"}, {"value": "babs@jensen.org"}])
        );
    }

    #[test]
    fn test_excluded_attributes_drop_from_default_set() {
        let projection = AttributeProjection::from_params(None, Some("emails,title")).unwrap();
        let projected = projection.apply(&user(), None);
        assert!(projected.get("emails").is_none());
        assert!(projected.get("title").is_none());
        assert_eq!(projected["name"]["familyName"], json!("Jensen"));
    }

    #[test]
    fn test_extension_attributes_project_by_urn() {
        let urn = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
        let projection =
            AttributeProjection::from_params(Some(&format!("{urn}:department")), None).unwrap();
        let projected = projection.apply(&user(), None);
        assert_eq!(projected[urn], json!({"department": "Tour Operations"}));
        assert!(projected.get("userName").is_none());

        let excluding = AttributeProjection::from_params(None, Some(&format!("{urn}:costCenter")))
            .unwrap();
        let projected = excluding.apply(&user(), None);
        assert_eq!(projected[urn], json!({"department": "Tour Operations"}));
    }

    #[test]
    fn test_bad_attribute_path_rejected() {
        assert!(AttributeProjection::from_params(Some("user..name"), None).is_err());
    }
}
