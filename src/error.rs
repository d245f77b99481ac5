//! Error types for SCIM core operations.
//!
//! Every failure the core can produce maps onto exactly one of the RFC 7644
//! `scimType` keywords, so callers can build a protocol-level error response
//! from any [`ScimError`] without inspecting its message.

use serde::{Deserialize, Serialize};

/// The RFC 7644 §3.12 error keyword carried by an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScimType {
    /// Filter string was malformed or used an operator not valid in context
    InvalidFilter,
    /// Result set exceeds the provider limit
    TooMany,
    /// A value conflicts with a uniqueness constraint
    Uniqueness,
    /// Attempted write to an attribute whose mutability forbids it
    Mutability,
    /// Message failed structural validation
    InvalidSyntax,
    /// Path string was malformed or targets an illegal location
    InvalidPath,
    /// A filtered replace matched nothing
    NoTarget,
    /// Value shape or type conflicts with the schema
    InvalidValue,
    /// Resource version mismatch
    InvalidVers,
    /// Request touched data the provider will not return
    Sensitive,
}

impl ScimType {
    /// The wire keyword, e.g. `"invalidPath"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScimType::InvalidFilter => "invalidFilter",
            ScimType::TooMany => "tooMany",
            ScimType::Uniqueness => "uniqueness",
            ScimType::Mutability => "mutability",
            ScimType::InvalidSyntax => "invalidSyntax",
            ScimType::InvalidPath => "invalidPath",
            ScimType::NoTarget => "noTarget",
            ScimType::InvalidValue => "invalidValue",
            ScimType::InvalidVers => "invalidVers",
            ScimType::Sensitive => "sensitive",
        }
    }
}

impl std::fmt::Display for ScimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for SCIM core operations.
///
/// Each variant corresponds to one `scimType` keyword; the detail string is
/// suitable for the `detail` field of an error response.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Malformed path string or value filter in an illegal position
    #[error("Invalid path: {detail}")]
    InvalidPath {
        /// What makes the path invalid
        detail: String,
    },

    /// Malformed filter, unsupported operator, or ambiguous match
    #[error("Invalid filter: {detail}")]
    InvalidFilter {
        /// What makes the filter invalid
        detail: String,
    },

    /// Replace targeted a filter that matched nothing
    #[error("No target: {detail}")]
    NoTarget {
        /// The path that matched nothing
        detail: String,
    },

    /// A value would conflict with an existing one
    #[error("Uniqueness conflict: {detail}")]
    Uniqueness {
        /// Which attribute already carries a value
        detail: String,
    },

    /// Write to an attribute whose mutability forbids it
    #[error("Mutability violation: {detail}")]
    Mutability {
        /// Which attribute is protected
        detail: String,
    },

    /// Value shape or type conflicts with the schema
    #[error("Invalid value: {detail}")]
    InvalidValue {
        /// What makes the value invalid
        detail: String,
    },

    /// Message failed structural validation
    #[error("Invalid syntax: {detail}")]
    InvalidSyntax {
        /// What part of the message is malformed
        detail: String,
    },

    /// Result set exceeds the provider limit
    #[error("Too many results: {detail}")]
    TooMany {
        /// The limit that was exceeded
        detail: String,
    },

    /// Resource version mismatch
    #[error("Invalid version: {detail}")]
    InvalidVersion {
        /// The version that did not match
        detail: String,
    },

    /// JSON (de)serialization failure, surfaced as `invalidSyntax`
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScimError {
    /// Create an `invalidPath` error.
    pub fn invalid_path(detail: impl Into<String>) -> Self {
        Self::InvalidPath {
            detail: detail.into(),
        }
    }

    /// Create an `invalidFilter` error.
    pub fn invalid_filter(detail: impl Into<String>) -> Self {
        Self::InvalidFilter {
            detail: detail.into(),
        }
    }

    /// Create a `noTarget` error.
    pub fn no_target(detail: impl Into<String>) -> Self {
        Self::NoTarget {
            detail: detail.into(),
        }
    }

    /// Create a `uniqueness` error.
    pub fn uniqueness(detail: impl Into<String>) -> Self {
        Self::Uniqueness {
            detail: detail.into(),
        }
    }

    /// Create a `mutability` error.
    pub fn mutability(detail: impl Into<String>) -> Self {
        Self::Mutability {
            detail: detail.into(),
        }
    }

    /// Create an `invalidValue` error.
    pub fn invalid_value(detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            detail: detail.into(),
        }
    }

    /// Create an `invalidSyntax` error.
    pub fn invalid_syntax(detail: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            detail: detail.into(),
        }
    }

    /// Create a `tooMany` error.
    pub fn too_many(detail: impl Into<String>) -> Self {
        Self::TooMany {
            detail: detail.into(),
        }
    }

    /// Create an `invalidVers` error.
    pub fn invalid_version(detail: impl Into<String>) -> Self {
        Self::InvalidVersion {
            detail: detail.into(),
        }
    }

    /// The `scimType` keyword for this error.
    pub fn scim_type(&self) -> ScimType {
        match self {
            ScimError::InvalidPath { .. } => ScimType::InvalidPath,
            ScimError::InvalidFilter { .. } => ScimType::InvalidFilter,
            ScimError::NoTarget { .. } => ScimType::NoTarget,
            ScimError::Uniqueness { .. } => ScimType::Uniqueness,
            ScimError::Mutability { .. } => ScimType::Mutability,
            ScimError::InvalidValue { .. } => ScimType::InvalidValue,
            ScimError::InvalidSyntax { .. } => ScimType::InvalidSyntax,
            ScimError::TooMany { .. } => ScimType::TooMany,
            ScimError::InvalidVersion { .. } => ScimType::InvalidVers,
            ScimError::Json(_) => ScimType::InvalidSyntax,
        }
    }

    /// The HTTP status code a service provider would answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            ScimError::Uniqueness { .. } | ScimError::InvalidVersion { .. } => 409,
            _ => 400,
        }
    }
}

/// Result type alias used throughout the crate.
pub type ScimResult<T> = Result<T, ScimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ScimError::invalid_path("trailing dot");
        assert!(error.to_string().contains("trailing dot"));
        assert_eq!(error.scim_type(), ScimType::InvalidPath);
    }

    #[test]
    fn test_scim_type_keywords() {
        assert_eq!(ScimType::InvalidFilter.as_str(), "invalidFilter");
        assert_eq!(ScimType::NoTarget.as_str(), "noTarget");
        assert_eq!(ScimType::InvalidVers.as_str(), "invalidVers");
    }

    #[test]
    fn test_json_error_maps_to_invalid_syntax() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ScimError::from(json_err);
        assert_eq!(error.scim_type(), ScimType::InvalidSyntax);
    }

    #[test]
    fn test_uniqueness_conflicts_at_409() {
        assert_eq!(ScimError::uniqueness("already set").http_status(), 409);
        assert_eq!(ScimError::invalid_value("bad shape").http_status(), 400);
    }
}
