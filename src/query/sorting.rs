//! Result sorting per RFC 7644 §3.4.2.3.

use crate::error::ScimResult;
use crate::filter::eval::scim_cmp;
use crate::messages::SortOrder;
use crate::path::Path;
use crate::schema::SchemaRegistry;
use serde_json::Value;
use std::cmp::Ordering;

/// A parsed `sortBy` / `sortOrder` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub path: Path,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(path: Path, order: SortOrder) -> Self {
        Self { path, order }
    }

    /// Parse the `sortBy` and `sortOrder` query parameters. Absent or
    /// unrecognized `sortOrder` defaults to ascending; absent `sortBy`
    /// means no sorting at all.
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> ScimResult<Option<Self>> {
        let Some(sort_by) = sort_by else {
            return Ok(None);
        };
        let order = match sort_order.map(str::to_ascii_lowercase).as_deref() {
            Some("descending") | Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        };
        Ok(Some(Self::new(sort_by.parse()?, order)))
    }
}

/// Sort resource documents in place by the spec's attribute.
///
/// Comparison follows the attribute's type (dateTime instants, decimal
/// numbers, case folding per `caseExact` when a registry is supplied); a
/// multi-valued attribute sorts by its first value, and resources missing
/// the attribute sort last regardless of direction.
pub fn sort_resources(resources: &mut [Value], spec: &SortSpec, registry: Option<&SchemaRegistry>) {
    let case_exact = registry.map(|r| r.case_exact(&spec.path)).unwrap_or(false);
    let attr_type = registry.and_then(|r| r.attribute_type(&spec.path));

    resources.sort_by(|a, b| {
        let left = sort_key(a, &spec.path);
        let right = sort_key(b, &spec.path);
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(x), Some(y)) => {
                scim_cmp(x, y, case_exact, attr_type).unwrap_or(Ordering::Equal)
            }
        };
        match spec.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// The first non-null value the sort path resolves to.
fn sort_key<'v>(resource: &'v Value, path: &Path) -> Option<&'v Value> {
    let mut node = resource;
    if let Some(urn) = path.schema_urn() {
        node = node
            .as_object()
            .and_then(|o| crate::value::get_ignore_case(o, urn))?;
    }
    for segment in path.segments() {
        node = match node {
            Value::Object(obj) => crate::value::get_ignore_case(obj, segment.attribute())?,
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object())
                .find_map(|obj| crate::value::get_ignore_case(obj, segment.attribute()))?,
            _ => return None,
        };
    }
    match node {
        Value::Null => None,
        Value::Array(items) => items.iter().find(|v| !v.is_null()),
        other => Some(other),
    }
}
