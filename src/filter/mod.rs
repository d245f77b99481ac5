//! SCIM filter expressions.
//!
//! A [`Filter`] is the parsed form of the RFC 7644 §3.4.2.2 predicate
//! language: comparison operators (`eq ne co sw ew gt ge lt le`), the
//! presence operator (`pr`), the logical connectives (`and or not`), and
//! complex value filters (`emails[type eq "work"]`).
//!
//! Combining filters are n-ary and compare as unordered multisets, so
//! `a and b` equals `b and a`. Comparison filters compare by attribute path
//! (case-insensitive) and literal value (decimal-aware).

pub mod eval;
mod parser;

pub use eval::{FilterEvaluator, evaluate};

use crate::error::{ScimError, ScimResult};
use crate::path::Path;
use crate::value::values_equal;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed filter expression.
#[derive(Debug, Clone)]
pub enum Filter {
    /// `attr eq literal`
    Equal(Path, Value),
    /// `attr ne literal`
    NotEqual(Path, Value),
    /// `attr co literal` (substring, strings only)
    Contains(Path, Value),
    /// `attr sw literal` (prefix, strings only)
    StartsWith(Path, Value),
    /// `attr ew literal` (suffix, strings only)
    EndsWith(Path, Value),
    /// `attr gt literal`
    GreaterThan(Path, Value),
    /// `attr ge literal`
    GreaterThanOrEqual(Path, Value),
    /// `attr lt literal`
    LessThan(Path, Value),
    /// `attr le literal`
    LessThanOrEqual(Path, Value),
    /// `attr pr`
    Present(Path),
    /// Conjunction; children are flattened at construction
    And(Vec<Filter>),
    /// Disjunction; children are flattened at construction
    Or(Vec<Filter>),
    /// Negation
    Not(Box<Filter>),
    /// Value filter bound to a complex attribute: `attr[sub]`
    Complex(Path, Box<Filter>),
}

impl Filter {
    /// `path eq value`
    pub fn eq(path: Path, value: Value) -> Self {
        Filter::Equal(path, value)
    }

    /// `path ne value`
    pub fn ne(path: Path, value: Value) -> Self {
        Filter::NotEqual(path, value)
    }

    /// `path co value`
    pub fn co(path: Path, value: Value) -> Self {
        Filter::Contains(path, value)
    }

    /// `path sw value`
    pub fn sw(path: Path, value: Value) -> Self {
        Filter::StartsWith(path, value)
    }

    /// `path ew value`
    pub fn ew(path: Path, value: Value) -> Self {
        Filter::EndsWith(path, value)
    }

    /// `path gt value`
    pub fn gt(path: Path, value: Value) -> Self {
        Filter::GreaterThan(path, value)
    }

    /// `path ge value`
    pub fn ge(path: Path, value: Value) -> Self {
        Filter::GreaterThanOrEqual(path, value)
    }

    /// `path lt value`
    pub fn lt(path: Path, value: Value) -> Self {
        Filter::LessThan(path, value)
    }

    /// `path le value`
    pub fn le(path: Path, value: Value) -> Self {
        Filter::LessThanOrEqual(path, value)
    }

    /// `path pr`
    pub fn pr(path: Path) -> Self {
        Filter::Present(path)
    }

    /// Conjunction of `children`, flattening nested `and`s.
    pub fn and(children: Vec<Filter>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Filter::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Filter::And(flat)
    }

    /// Disjunction of `children`, flattening nested `or`s.
    pub fn or(children: Vec<Filter>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Filter::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Filter::Or(flat)
    }

    /// Negation of `child`.
    pub fn not(child: Filter) -> Self {
        Filter::Not(Box::new(child))
    }

    /// Value filter `path[predicate]`.
    pub fn complex(path: Path, predicate: Filter) -> Self {
        Filter::Complex(path, Box::new(predicate))
    }

    /// The attribute path of a comparison, presence, or complex node.
    pub fn attribute_path(&self) -> Option<&Path> {
        match self {
            Filter::Equal(p, _)
            | Filter::NotEqual(p, _)
            | Filter::Contains(p, _)
            | Filter::StartsWith(p, _)
            | Filter::EndsWith(p, _)
            | Filter::GreaterThan(p, _)
            | Filter::GreaterThanOrEqual(p, _)
            | Filter::LessThan(p, _)
            | Filter::LessThanOrEqual(p, _)
            | Filter::Present(p)
            | Filter::Complex(p, _) => Some(p),
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => None,
        }
    }

    /// The literal of a comparison node.
    pub fn comparison_value(&self) -> Option<&Value> {
        match self {
            Filter::Equal(_, v)
            | Filter::NotEqual(_, v)
            | Filter::Contains(_, v)
            | Filter::StartsWith(_, v)
            | Filter::EndsWith(_, v)
            | Filter::GreaterThan(_, v)
            | Filter::GreaterThanOrEqual(_, v)
            | Filter::LessThan(_, v)
            | Filter::LessThanOrEqual(_, v) => Some(v),
            _ => None,
        }
    }

    /// True when the expression contains a bracketed value filter anywhere.
    pub fn has_value_filter(&self) -> bool {
        match self {
            Filter::Complex(_, _) => true,
            Filter::And(children) | Filter::Or(children) => {
                children.iter().any(Filter::has_value_filter)
            }
            Filter::Not(child) => child.has_value_filter(),
            _ => false,
        }
    }

    /// The wire keyword for this node's operator.
    fn operator(&self) -> &'static str {
        match self {
            Filter::Equal(..) => "eq",
            Filter::NotEqual(..) => "ne",
            Filter::Contains(..) => "co",
            Filter::StartsWith(..) => "sw",
            Filter::EndsWith(..) => "ew",
            Filter::GreaterThan(..) => "gt",
            Filter::GreaterThanOrEqual(..) => "ge",
            Filter::LessThan(..) => "lt",
            Filter::LessThanOrEqual(..) => "le",
            Filter::Present(..) => "pr",
            Filter::And(..) => "and",
            Filter::Or(..) => "or",
            Filter::Not(..) => "not",
            Filter::Complex(..) => "",
        }
    }
}

/// Multiset equality over filter children.
fn children_equal_unordered(a: &[Filter], b: &[Filter]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for item in a {
        let Some(pos) = b
            .iter()
            .enumerate()
            .position(|(i, other)| !used[i] && item == other)
        else {
            return false;
        };
        used[pos] = true;
    }
    true
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        use Filter::*;
        match (self, other) {
            (And(a), And(b)) | (Or(a), Or(b)) => children_equal_unordered(a, b),
            (Not(a), Not(b)) => a == b,
            (Complex(pa, fa), Complex(pb, fb)) => pa == pb && fa == fb,
            (Present(a), Present(b)) => a == b,
            _ => {
                std::mem::discriminant(self) == std::mem::discriminant(other)
                    && self.attribute_path() == other.attribute_path()
                    && match (self.comparison_value(), other.comparison_value()) {
                        (Some(a), Some(b)) => values_equal(a, b),
                        (None, None) => true,
                        _ => false,
                    }
            }
        }
    }
}

impl Eq for Filter {}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Present(path) => write!(f, "{path} pr"),
            Filter::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    // `or` binds looser than `and`
                    if matches!(child, Filter::Or(_)) {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                Ok(())
            }
            Filter::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Filter::Not(child) => write!(f, "not ({child})"),
            Filter::Complex(path, predicate) => write!(f, "{path}[{predicate}]"),
            comparison => {
                let path = comparison.attribute_path().expect("comparison has a path");
                match comparison.comparison_value() {
                    Some(value) => write!(f, "{path} {} {value}", comparison.operator()),
                    None => write!(f, "{path} {}", comparison.operator()),
                }
            }
        }
    }
}

impl FromStr for Filter {
    type Err = ScimError;

    fn from_str(input: &str) -> ScimResult<Self> {
        parser::parse_filter(input)
    }
}
