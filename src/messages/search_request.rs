//! Search request envelope (`POST /.search`).

use super::{SEARCH_REQUEST_URN, schemas_contain};
use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Serialize};

/// Sort direction for [`SearchRequest::sort_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// The RFC 7644 §3.4.3 search request.
///
/// Carries the query parameters of a filtered list in a request body; the
/// core validates shape only, execution belongs to the service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl SearchRequest {
    /// An empty search request (no filter, default paging).
    pub fn new() -> Self {
        Self {
            schemas: vec![SEARCH_REQUEST_URN.to_string()],
            attributes: Vec::new(),
            excluded_attributes: Vec::new(),
            filter: None,
            sort_by: None,
            sort_order: None,
            start_index: None,
            count: None,
        }
    }

    /// Structural validation: envelope URN, parseable filter and paths.
    pub fn validate(&self) -> ScimResult<()> {
        if !schemas_contain(&self.schemas, SEARCH_REQUEST_URN) {
            return Err(ScimError::invalid_syntax(format!(
                "search request schemas must contain '{SEARCH_REQUEST_URN}'"
            )));
        }
        if let Some(filter) = &self.filter {
            let _: crate::filter::Filter = filter.parse()?;
        }
        if let Some(sort_by) = &self.sort_by {
            let _: crate::path::Path = sort_by.parse()?;
        }
        for attribute in self.attributes.iter().chain(&self.excluded_attributes) {
            let _: crate::path::Path = attribute.parse()?;
        }
        Ok(())
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let raw = json!({
            "schemas": [SEARCH_REQUEST_URN],
            "attributes": ["displayName", "userName"],
            "filter": "displayName sw \"smith\"",
            "sortBy": "name.familyName",
            "sortOrder": "descending",
            "startIndex": 1,
            "count": 10
        });
        let request: SearchRequest = serde_json::from_value(raw).unwrap();
        request.validate().unwrap();
        assert_eq!(request.sort_order, Some(SortOrder::Descending));

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["sortBy"], json!("name.familyName"));
        assert!(back.get("excludedAttributes").is_none());
    }

    #[test]
    fn test_bad_filter_rejected() {
        let mut request = SearchRequest::new();
        request.filter = Some("displayName sw".to_string());
        assert!(request.validate().is_err());
    }
}
