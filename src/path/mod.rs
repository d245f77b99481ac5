//! Attribute paths.
//!
//! A [`Path`] names a location inside a SCIM resource: an optional schema
//! URN prefix selecting an extension, followed by dot-separated segments,
//! each an attribute name with an optional bracketed value filter.
//!
//! ```text
//! userName
//! name.givenName
//! emails[type eq "work"].value
//! urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName
//! ```
//!
//! Attribute names and schema URNs compare case-insensitively; two paths are
//! equal when their URNs, segment names, and value filters all match.

use crate::error::{ScimError, ScimResult};
use crate::filter::Filter;
use crate::schema::SchemaRegistry;
use std::fmt;
use std::str::FromStr;

/// One step of a path: an attribute name plus an optional value filter
/// selecting elements of a multi-valued attribute.
#[derive(Debug, Clone)]
pub struct Segment {
    attribute: String,
    value_filter: Option<Filter>,
}

impl Segment {
    /// A plain attribute segment.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value_filter: None,
        }
    }

    /// An attribute segment with a value filter, as in `emails[type eq "work"]`.
    pub fn with_filter(attribute: impl Into<String>, filter: Filter) -> Self {
        Self {
            attribute: attribute.into(),
            value_filter: Some(filter),
        }
    }

    /// The attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The value filter, if any.
    pub fn value_filter(&self) -> Option<&Filter> {
        self.value_filter.as_ref()
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute)
            && self.value_filter == other.value_filter
    }
}

impl Eq for Segment {}

/// A parsed attribute path.
#[derive(Debug, Clone, Default)]
pub struct Path {
    schema_urn: Option<String>,
    segments: Vec<Segment>,
}

impl Path {
    /// The zero-segment path designating the resource itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// The zero-segment path designating an extension root.
    pub fn root_with_urn(urn: impl Into<String>) -> ScimResult<Self> {
        let urn = urn.into();
        if !is_urn(&urn) {
            return Err(ScimError::invalid_path(format!(
                "'{urn}' is not a schema URN"
            )));
        }
        Ok(Self {
            schema_urn: Some(urn),
            segments: Vec::new(),
        })
    }

    /// Append a plain attribute segment.
    pub fn child(mut self, attribute: impl Into<String>) -> Self {
        self.segments.push(Segment::new(attribute));
        self
    }

    /// Append an attribute segment carrying a value filter.
    pub fn filtered_child(mut self, attribute: impl Into<String>, filter: Filter) -> Self {
        self.segments.push(Segment::with_filter(attribute, filter));
        self
    }

    /// The schema URN prefix, if any.
    pub fn schema_urn(&self) -> Option<&str> {
        self.schema_urn.as_deref()
    }

    /// The path segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for a zero-segment path (the resource or an extension root).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when any segment carries a value filter.
    pub fn has_value_filter(&self) -> bool {
        self.segments.iter().any(|s| s.value_filter.is_some())
    }

    /// Parse a path, resolving the URN prefix against registered schemas.
    ///
    /// A bare extension URN such as
    /// `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User` is only
    /// recognizable as an extension root when the schema is known; this
    /// variant matches registered URNs longest-first before falling back to
    /// the syntactic rule used by [`Path::from_str`].
    pub fn parse_with_registry(input: &str, registry: &SchemaRegistry) -> ScimResult<Self> {
        let lowered = input.to_ascii_lowercase();
        let mut best: Option<&str> = None;
        for schema in registry.schemas() {
            let id = schema.id.to_ascii_lowercase();
            let matches = lowered == id
                || (lowered.starts_with(&id) && lowered.as_bytes().get(id.len()) == Some(&b':'));
            if matches && best.is_none_or(|b| schema.id.len() > b.len()) {
                best = Some(&schema.id);
            }
        }
        match best {
            Some(urn) => {
                let rest = &input[urn.len()..];
                let rest = rest.strip_prefix(':').unwrap_or(rest);
                let mut path = parse_attribute_path(rest)?;
                path.schema_urn = Some(urn.to_string());
                Ok(path)
            }
            None => input.parse(),
        }
    }

    /// Concatenate two paths.
    ///
    /// The right side's segments are appended; its URN, when present, wins
    /// (a schema-qualified sub-path re-roots the lookup at that extension).
    pub fn join(&self, other: &Path) -> Path {
        Path {
            schema_urn: other
                .schema_urn
                .clone()
                .or_else(|| self.schema_urn.clone()),
            segments: self
                .segments
                .iter()
                .chain(other.segments.iter())
                .cloned()
                .collect(),
        }
    }

    /// Re-interpret the URN boundary against a registry.
    ///
    /// A path parsed without schema knowledge may have put the final URN
    /// component into its first segment (`urn:...:2.0` + `User`); when the
    /// joined form names a registered schema, this shifts the boundary.
    pub fn normalized(&self, registry: &SchemaRegistry) -> Path {
        let Some(urn) = &self.schema_urn else {
            return self.clone();
        };
        let Some(first) = self.segments.first() else {
            return self.clone();
        };
        if first.value_filter.is_some() {
            return self.clone();
        }
        let joined = format!("{}:{}", urn, first.attribute);
        if registry.get_schema(&joined).is_some() {
            return Path {
                schema_urn: Some(joined),
                segments: self.segments[1..].to_vec(),
            };
        }
        self.clone()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        let urns_match = match (&self.schema_urn, &other.schema_urn) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        urns_match && self.segments == other.segments
    }
}

impl Eq for Path {}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(urn) = &self.schema_urn {
            f.write_str(urn)?;
            if !self.segments.is_empty() {
                f.write_str(":")?;
            }
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.attribute)?;
            if let Some(filter) = &segment.value_filter {
                write!(f, "[{filter}]")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ScimError;

    /// Parse a path string.
    ///
    /// The schema URN prefix is delimited by the last colon appearing before
    /// the first `[` (longest match); the remainder must be a well-formed
    /// dotted attribute path.
    fn from_str(input: &str) -> ScimResult<Self> {
        if input.is_empty() {
            return Ok(Path::root());
        }
        if input.to_ascii_lowercase().starts_with("urn:") {
            let bracket = input.find('[').unwrap_or(input.len());
            match input[..bracket].rfind(':') {
                Some(idx) if idx > 3 => {
                    let urn = &input[..idx];
                    if !is_urn(urn) {
                        return Err(ScimError::invalid_path(format!(
                            "'{urn}' is not a schema URN"
                        )));
                    }
                    let mut path = parse_attribute_path(&input[idx + 1..])?;
                    path.schema_urn = Some(urn.to_string());
                    return Ok(path);
                }
                _ => {
                    return Err(ScimError::invalid_path(format!(
                        "'{input}' has a URN prefix but no attribute path"
                    )));
                }
            }
        }
        parse_attribute_path(input)
    }
}

/// Syntactic URN check: `urn:` followed by non-empty colon-separated
/// components of unreserved characters.
fn is_urn(input: &str) -> bool {
    let mut parts = input.split(':');
    if !parts
        .next()
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("urn"))
    {
        return false;
    }
    let mut count = 0;
    for part in parts {
        if part.is_empty()
            || !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '%'))
        {
            return false;
        }
        count += 1;
    }
    count >= 2
}

fn is_attr_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_'
}

fn is_attr_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '$' | '_' | '-')
}

/// Parse the dotted-segment portion of a path (no URN prefix).
fn parse_attribute_path(input: &str) -> ScimResult<Path> {
    if input.is_empty() {
        return Ok(Path::root());
    }

    let mut segments = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;

    loop {
        // Attribute name
        let start = pos;
        if pos < chars.len() && is_attr_name_start(chars[pos]) {
            pos += 1;
            while pos < chars.len() && is_attr_name_char(chars[pos]) {
                pos += 1;
            }
        }
        if pos == start {
            return Err(ScimError::invalid_path(format!(
                "expected attribute name at position {start} in '{input}'"
            )));
        }
        let attribute: String = chars[start..pos].iter().collect();

        // Optional value filter
        let mut value_filter = None;
        if pos < chars.len() && chars[pos] == '[' {
            let close = matching_bracket(&chars, pos).ok_or_else(|| {
                ScimError::invalid_path(format!("unbalanced brackets in '{input}'"))
            })?;
            let inner: String = chars[pos + 1..close].iter().collect();
            let filter: Filter = inner.parse()?;
            if filter.has_value_filter() {
                return Err(ScimError::invalid_path(format!(
                    "nested value filter in '{input}'"
                )));
            }
            value_filter = Some(filter);
            pos = close + 1;
            if pos < chars.len() && chars[pos] == '[' {
                return Err(ScimError::invalid_path(format!(
                    "second value filter on one segment in '{input}'"
                )));
            }
        }

        segments.push(Segment {
            attribute,
            value_filter,
        });

        if pos == chars.len() {
            break;
        }
        if chars[pos] != '.' {
            return Err(ScimError::invalid_path(format!(
                "unexpected character '{}' at position {pos} in '{input}'",
                chars[pos]
            )));
        }
        pos += 1;
        if pos == chars.len() {
            return Err(ScimError::invalid_path(format!(
                "trailing '.' in '{input}'"
            )));
        }
    }

    Ok(Path {
        schema_urn: None,
        segments,
    })
}

/// Index of the `]` matching the `[` at `open`, skipping quoted strings.
fn matching_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut in_quotes = false;
    let mut escape_next = false;
    for (i, &c) in chars.iter().enumerate().skip(open + 1) {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escape_next = true,
            '"' => in_quotes = !in_quotes,
            ']' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(input: &str) -> Path {
        input.parse().unwrap()
    }

    #[test]
    fn test_simple_attribute() {
        let path = parse("userName");
        assert_eq!(path.segments().len(), 1);
        assert_eq!(path.segments()[0].attribute(), "userName");
        assert!(path.schema_urn().is_none());
    }

    #[test]
    fn test_sub_attribute() {
        let path = parse("name.givenName");
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[1].attribute(), "givenName");
    }

    #[test]
    fn test_value_filter_segment() {
        let path = parse("emails[type eq \"work\"].value");
        assert_eq!(path.segments().len(), 2);
        assert!(path.segments()[0].value_filter().is_some());
        assert!(path.segments()[1].value_filter().is_none());
    }

    #[test]
    fn test_urn_prefix_longest_match() {
        let path = parse("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName");
        assert_eq!(
            path.schema_urn().unwrap(),
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        );
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[0].attribute(), "manager");
    }

    #[test]
    fn test_filter_literal_may_contain_colon_and_bracket() {
        let path = parse(r#"members[value eq "urn:x:y"].display"#);
        assert!(path.schema_urn().is_none());
        let path = parse(r#"members[display eq "a]b"]"#);
        assert_eq!(path.segments().len(), 1);
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "userName",
            "name.givenName",
            "emails[type eq \"work\"].value",
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber",
            "addresses[type eq \"home\" and primary eq true].streetAddress",
        ] {
            let path = parse(input);
            let reparsed = parse(&path.to_string());
            assert_eq!(path, reparsed, "round trip failed for '{input}'");
        }
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        assert_eq!(parse("userName"), parse("USERNAME"));
        assert_eq!(
            parse("urn:ietf:params:scim:schemas:core:2.0:User:userName"),
            parse("URN:IETF:PARAMS:SCIM:SCHEMAS:CORE:2.0:User:username")
        );
        assert_ne!(parse("userName"), parse("displayName"));
    }

    #[test]
    fn test_malformed_paths_rejected() {
        for input in [
            "userName.",
            ".userName",
            "emails[type eq \"work\"",
            "emails[type eq \"work\"][primary eq true]",
            "emails[]",
            "9illegal",
            "urn:",
            "name..givenName",
            "emails[members[value eq \"x\"] pr]",
        ] {
            assert!(input.parse::<Path>().is_err(), "'{input}' should not parse");
        }
    }

    #[test]
    fn test_registry_aware_extension_root() {
        let registry = SchemaRegistry::new().unwrap();
        let urn = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
        let path = Path::parse_with_registry(urn, &registry).unwrap();
        assert!(path.is_root());
        assert_eq!(path.schema_urn().unwrap(), urn);

        let deeper =
            Path::parse_with_registry(&format!("{urn}:employeeNumber"), &registry).unwrap();
        assert_eq!(deeper.segments().len(), 1);
        assert_eq!(deeper.segments()[0].attribute(), "employeeNumber");
    }

    #[test]
    fn test_normalized_shifts_urn_boundary() {
        let registry = SchemaRegistry::new().unwrap();
        let parsed = parse("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber");
        assert_eq!(parsed.segments().len(), 1);

        let raw: Path = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
            .parse()
            .unwrap();
        // Syntactically this looks like urn + attribute "User".
        assert_eq!(raw.segments().len(), 1);
        let normalized = raw.normalized(&registry);
        assert!(normalized.is_root());
        assert_eq!(
            normalized.schema_urn().unwrap(),
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        );
    }

    #[test]
    fn test_builder() {
        let path = Path::root()
            .filtered_child("emails", Filter::eq(Path::root().child("type"), json!("work")))
            .child("value");
        assert_eq!(path.to_string(), "emails[type eq \"work\"].value");
        assert_eq!(path, parse("emails[type eq \"work\"].value"));
    }
}
