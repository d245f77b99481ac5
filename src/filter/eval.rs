//! Filter evaluation against a JSON-shaped resource.
//!
//! Evaluation is a pure function of `(filter, subject)` plus an optional
//! schema registry informing case-exactness and attribute types. Operators
//! that are undefined for the operand types at hand evaluate to `false`
//! rather than failing, per RFC 7644.

use super::Filter;
use crate::datetime;
use crate::path::Path;
use crate::schema::{AttributeType, SchemaRegistry};
use crate::value::{decode_base64, get_ignore_case, values_equal};
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate a filter against a subject without schema information.
///
/// All string comparisons are case-insensitive (the RFC 7643 default) and
/// dateTime semantics are inferred when both operands parse as timestamps.
pub fn evaluate(filter: &Filter, subject: &Value) -> bool {
    FilterEvaluator::new().matches(filter, subject)
}

/// Filter evaluator, optionally schema-informed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEvaluator<'a> {
    registry: Option<&'a SchemaRegistry>,
}

impl<'a> FilterEvaluator<'a> {
    /// A schemaless evaluator.
    pub fn new() -> Self {
        Self { registry: None }
    }

    /// An evaluator honoring `caseExact` and declared attribute types.
    pub fn with_registry(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    /// Whether `subject` satisfies `filter`.
    pub fn matches(&self, filter: &Filter, subject: &Value) -> bool {
        self.matches_at(filter, subject, &Path::root())
    }

    /// `base` is the attribute-path prefix of `subject` within the resource,
    /// used only for schema lookups inside complex value filters.
    fn matches_at(&self, filter: &Filter, subject: &Value, base: &Path) -> bool {
        match filter {
            Filter::And(children) => children.iter().all(|c| self.matches_at(c, subject, base)),
            Filter::Or(children) => children.iter().any(|c| self.matches_at(c, subject, base)),
            Filter::Not(child) => !self.matches_at(child, subject, base),
            Filter::Present(path) => candidates(path, subject).iter().any(|v| is_present(v)),
            Filter::Complex(path, predicate) => {
                let inner_base = base.join(path);
                candidates(path, subject)
                    .iter()
                    .any(|element| self.matches_at(predicate, element, &inner_base))
            }
            comparison => self.compare(comparison, subject, base),
        }
    }

    fn compare(&self, filter: &Filter, subject: &Value, base: &Path) -> bool {
        let path = filter.attribute_path().expect("comparison carries a path");
        let literal = filter.comparison_value().expect("comparison carries a value");
        let full_path = base.join(path);
        let case_exact = self
            .registry
            .map(|r| r.case_exact(&full_path))
            .unwrap_or(false);
        let attr_type = self.registry.and_then(|r| r.attribute_type(&full_path));
        let found = candidates(path, subject);

        match filter {
            // `eq null` matches a missing, null, or empty-array attribute
            Filter::Equal(_, _) if literal.is_null() => found.is_empty(),
            Filter::NotEqual(_, _) if literal.is_null() => !found.is_empty(),
            Filter::Equal(_, _) => found
                .iter()
                .any(|v| scim_eq(v, literal, case_exact, attr_type)),
            Filter::NotEqual(_, _) => found
                .iter()
                .any(|v| !scim_eq(v, literal, case_exact, attr_type)),
            Filter::Contains(_, _) => {
                string_op(&found, literal, case_exact, |hay, needle| hay.contains(needle))
            }
            Filter::StartsWith(_, _) => {
                string_op(&found, literal, case_exact, |hay, needle| {
                    hay.starts_with(needle)
                })
            }
            Filter::EndsWith(_, _) => {
                string_op(&found, literal, case_exact, |hay, needle| hay.ends_with(needle))
            }
            Filter::GreaterThan(_, _) => ordering_op(&found, literal, case_exact, attr_type, |o| {
                o == Ordering::Greater
            }),
            Filter::GreaterThanOrEqual(_, _) => {
                ordering_op(&found, literal, case_exact, attr_type, |o| {
                    o != Ordering::Less
                })
            }
            Filter::LessThan(_, _) => ordering_op(&found, literal, case_exact, attr_type, |o| {
                o == Ordering::Less
            }),
            Filter::LessThanOrEqual(_, _) => {
                ordering_op(&found, literal, case_exact, attr_type, |o| {
                    o != Ordering::Greater
                })
            }
            _ => false,
        }
    }
}

/// Resolve an attribute path to comparison candidates.
///
/// Dotted segments traverse objects; arrays fan out element-wise; the final
/// values are flattened one level and nulls dropped, so a missing attribute,
/// an explicit null, and an empty array all yield no candidates. On a
/// non-object subject the single-segment path `value` designates the subject
/// itself, which is how predicates select elements of simple multi-valued
/// attributes.
fn candidates<'v>(path: &Path, subject: &'v Value) -> Vec<&'v Value> {
    let mut nodes: Vec<&Value> = vec![subject];

    if let Some(urn) = path.schema_urn() {
        nodes = nodes
            .into_iter()
            .filter_map(|n| n.as_object().and_then(|o| get_ignore_case(o, urn)))
            .collect();
    }

    for (i, segment) in path.segments().iter().enumerate() {
        let name = segment.attribute();
        let mut next = Vec::new();
        for node in nodes {
            match node {
                Value::Object(obj) => {
                    if let Some(v) = get_ignore_case(obj, name) {
                        next.push(v);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(obj) = item
                            && let Some(v) = get_ignore_case(obj, name)
                        {
                            next.push(v);
                        }
                    }
                }
                scalar => {
                    // `value` names a simple multi-valued element itself
                    if i == 0
                        && path.schema_urn().is_none()
                        && path.segments().len() == 1
                        && name.eq_ignore_ascii_case("value")
                        && !scalar.is_null()
                    {
                        next.push(node);
                    }
                }
            }
        }
        nodes = next;
    }

    let mut out = Vec::new();
    for node in nodes {
        match node {
            Value::Array(items) => out.extend(items.iter().filter(|v| !v.is_null())),
            Value::Null => {}
            other => out.push(other),
        }
    }
    out
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn fold(s: &str, case_exact: bool) -> String {
    if case_exact {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

fn string_op(
    found: &[&Value],
    literal: &Value,
    case_exact: bool,
    op: impl Fn(&str, &str) -> bool,
) -> bool {
    let Value::String(needle) = literal else {
        return false;
    };
    let needle = fold(needle, case_exact);
    found.iter().any(|v| match v {
        Value::String(hay) => op(&fold(hay, case_exact), &needle),
        _ => false,
    })
}

/// Equality with SCIM semantics: decimal numbers, case folding per
/// `caseExact`, instant comparison for dateTimes, byte comparison for
/// binary attributes.
fn scim_eq(candidate: &Value, literal: &Value, case_exact: bool, attr_type: Option<AttributeType>) -> bool {
    match (candidate, literal) {
        (Value::String(a), Value::String(b)) => match attr_type {
            Some(AttributeType::Binary) => match (decode_base64(a), decode_base64(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            Some(AttributeType::DateTime) => datetime::same_instant(candidate, literal),
            Some(_) => fold(a, case_exact) == fold(b, case_exact),
            None => {
                if datetime::same_instant(candidate, literal) {
                    true
                } else {
                    fold(a, case_exact) == fold(b, case_exact)
                }
            }
        },
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(_), _) | (Value::Object(_), _) => values_equal(candidate, literal),
        _ => false,
    }
}

/// Ordering for `gt ge lt le` and sorting: defined on numbers, dateTimes,
/// and strings; undefined combinations yield `None`.
pub(crate) fn scim_cmp(
    candidate: &Value,
    literal: &Value,
    case_exact: bool,
    attr_type: Option<AttributeType>,
) -> Option<Ordering> {
    match (candidate, literal) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            let as_instants = match attr_type {
                Some(AttributeType::DateTime) => true,
                Some(_) => false,
                None => {
                    datetime::parse_datetime(a).is_ok() && datetime::parse_datetime(b).is_ok()
                }
            };
            if as_instants {
                let x = datetime::parse_datetime(a).ok()?;
                let y = datetime::parse_datetime(b).ok()?;
                Some(x.cmp(&y))
            } else {
                Some(fold(a, case_exact).cmp(&fold(b, case_exact)))
            }
        }
        _ => None,
    }
}

fn ordering_op(
    found: &[&Value],
    literal: &Value,
    case_exact: bool,
    attr_type: Option<AttributeType>,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    found
        .iter()
        .any(|v| scim_cmp(v, literal, case_exact, attr_type).map(&accept).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(filter: &str, subject: &Value) -> bool {
        evaluate(&filter.parse().unwrap(), subject)
    }

    fn user() -> Value {
        json!({
            "userName": "bjensen",
            "title": "Tour Guide",
            "active": true,
            "loginCount": 42,
            "meta": {
                "created": "2011-08-01T18:29:49.793Z",
                "lastModified": "2015-03-09T07:59:45Z"
            },
            "emails": [
                {"value": "bjensen@example.com", "type": "work", "primary": true},
                {"value": "babs@jensen.org", "type": "home"}
            ],
            "addresses": [
                {"type": "work", "streetAddress": "100 Universal City Plaza", "locality": "Hollywood"},
                {"type": "home", "streetAddress": "456 Hollywood Blvd", "locality": "Hollywood"}
            ],
            "tags": ["alpha", "beta"]
        })
    }

    #[test]
    fn test_equality_defaults_to_case_insensitive() {
        let subject = user();
        assert!(eval("userName eq \"BJENSEN\"", &subject));
        assert!(eval("title eq \"tour guide\"", &subject));
        assert!(!eval("userName eq \"other\"", &subject));
    }

    #[test]
    fn test_case_exact_attribute_honored_with_registry() {
        let registry = SchemaRegistry::new().unwrap();
        let evaluator = FilterEvaluator::with_registry(&registry);
        let subject = json!({"id": "2819c223", "userName": "bjensen"});
        let exact: Filter = "id eq \"2819C223\"".parse().unwrap();
        assert!(!evaluator.matches(&exact, &subject));
        let insensitive: Filter = "userName eq \"BJENSEN\"".parse().unwrap();
        assert!(evaluator.matches(&insensitive, &subject));
    }

    #[test]
    fn test_eq_null_matches_missing_null_and_empty_array() {
        assert!(eval("title eq null", &json!({})));
        assert!(eval("title eq null", &json!({"title": null})));
        assert!(eval("title eq null", &json!({"title": []})));
        assert!(!eval("title eq null", &json!({"title": "boss"})));
        assert!(eval("title ne null", &json!({"title": "boss"})));
    }

    #[test]
    fn test_numeric_comparisons_are_decimal() {
        let subject = json!({"loginCount": 42});
        assert!(eval("loginCount eq 42.0", &subject));
        assert!(eval("loginCount gt 41.5", &subject));
        assert!(eval("loginCount le 42", &subject));
        assert!(!eval("loginCount lt 42", &subject));
    }

    #[test]
    fn test_datetime_comparisons_equate_instants() {
        let subject = json!({"meta": {"lastModified": "2025-03-09T01:59:45-06:00"}});
        assert!(eval(
            "meta.lastModified eq \"2025-03-09T07:59:45Z\"",
            &subject
        ));
        assert!(eval(
            "meta.lastModified gt \"2025-03-09T00:00:00Z\"",
            &subject
        ));
        assert!(!eval(
            "meta.lastModified lt \"2025-03-09T07:59:45Z\"",
            &subject
        ));
    }

    #[test]
    fn test_presence() {
        let subject = user();
        assert!(eval("title pr", &subject));
        assert!(eval("emails pr", &subject));
        assert!(!eval("nickName pr", &subject));
        assert!(!eval("title pr", &json!({"title": ""})));
        assert!(!eval("tags pr", &json!({"tags": []})));
    }

    #[test]
    fn test_substring_operators_are_string_only() {
        let subject = user();
        assert!(eval("userName co \"JENS\"", &subject));
        assert!(eval("userName sw \"bj\"", &subject));
        assert!(eval("userName ew \"SEN\"", &subject));
        assert!(!eval("loginCount co 4", &subject));
        assert!(!eval("active sw true", &subject));
    }

    #[test]
    fn test_ordering_undefined_on_booleans() {
        let subject = user();
        assert!(!eval("active gt false", &subject));
        assert!(!eval("active lt true", &subject));
    }

    #[test]
    fn test_multi_valued_attributes_match_element_wise() {
        let subject = user();
        assert!(eval("emails.value co \"jensen.org\"", &subject));
        assert!(eval("emails.type eq \"home\"", &subject));
        assert!(!eval("emails.type eq \"other\"", &subject));
    }

    #[test]
    fn test_complex_value_filter() {
        let subject = user();
        assert!(eval(
            "addresses[type eq \"home\" and streetAddress co \"Hollywood\"]",
            &subject
        ));
        assert!(!eval(
            "addresses[type eq \"work\" and streetAddress co \"Batcave\"]",
            &subject
        ));
        assert!(eval("emails[primary eq true]", &subject));
        assert!(!eval("emails[type eq \"other\"]", &subject));
    }

    #[test]
    fn test_value_designates_simple_array_element() {
        let subject = user();
        assert!(eval("tags[value eq \"alpha\"]", &subject));
        assert!(!eval("tags[value eq \"gamma\"]", &subject));
    }

    #[test]
    fn test_logical_connectives() {
        let subject = user();
        assert!(eval("title pr and active eq true", &subject));
        assert!(!eval("title pr and active eq false", &subject));
        assert!(eval("active eq false or userName sw \"bj\"", &subject));
        assert!(eval("not (nickName pr)", &subject));
    }

    #[test]
    fn test_extension_attribute_resolution() {
        let subject = json!({
            "userName": "bjensen",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "department": "Tour Operations"
            }
        });
        assert!(eval(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department eq \"tour operations\"",
            &subject
        ));
    }

    #[test]
    fn test_evaluation_does_not_mutate_subject() {
        let subject = user();
        let before = subject.clone();
        for filter in [
            "emails[type eq \"work\"]",
            "not (title pr)",
            "meta.created le \"2030-01-01T00:00:00Z\"",
        ] {
            let _ = eval(filter, &subject);
        }
        assert_eq!(subject, before);
    }
}
