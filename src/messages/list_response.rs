//! List/query response envelope.

use super::{LIST_RESPONSE_URN, schemas_contain};
use crate::error::{ScimError, ScimResult};
use crate::value::get_ignore_case;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The RFC 7644 §3.4.2 list response.
///
/// Wire rules: property names are matched case-insensitively on input,
/// `totalResults` is required, a missing `Resources` array is tolerated
/// exactly when `totalResults` is zero or `itemsPerPage` is zero (some
/// providers send that technically-invalid form), and serialization always
/// emits `Resources` as the final property.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T = Value> {
    pub schemas: Vec<String>,
    pub total_results: u64,
    pub start_index: Option<u64>,
    pub items_per_page: Option<u64>,
    pub previous_cursor: Option<String>,
    pub next_cursor: Option<String>,
    pub resources: Vec<T>,
}

impl<T> ListResponse<T> {
    /// A response carrying `resources` with the given total.
    pub fn new(total_results: u64, resources: Vec<T>) -> Self {
        Self {
            schemas: vec![LIST_RESPONSE_URN.to_string()],
            total_results,
            start_index: None,
            items_per_page: None,
            previous_cursor: None,
            next_cursor: None,
            resources,
        }
    }
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Deserialize an envelope, applying the leniency rules above.
    pub fn from_json(value: &Value) -> ScimResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ScimError::invalid_syntax("list response must be a JSON object"))?;

        let schemas = parse_schemas(obj)?;
        if !schemas_contain(&schemas, LIST_RESPONSE_URN) {
            return Err(ScimError::invalid_syntax(format!(
                "list response schemas must contain '{LIST_RESPONSE_URN}'"
            )));
        }

        let total_results = get_ignore_case(obj, "totalResults")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                ScimError::invalid_syntax("list response requires a numeric 'totalResults'")
            })?;
        let start_index = optional_u64(obj, "startIndex")?;
        let items_per_page = optional_u64(obj, "itemsPerPage")?;
        let previous_cursor = optional_string(obj, "previousCursor")?;
        let next_cursor = optional_string(obj, "nextCursor")?;

        let resources = match get_ignore_case(obj, "Resources") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| serde_json::from_value(item.clone()))
                .collect::<Result<Vec<T>, _>>()?,
            Some(Value::Null) | None => {
                if total_results == 0 || items_per_page == Some(0) {
                    Vec::new()
                } else {
                    return Err(ScimError::invalid_syntax(format!(
                        "list response is missing 'Resources' but totalResults is {total_results}"
                    )));
                }
            }
            Some(other) => {
                return Err(ScimError::invalid_syntax(format!(
                    "'Resources' must be an array, got {}",
                    crate::value::type_name(other)
                )));
            }
        };

        Ok(Self {
            schemas,
            total_results,
            start_index,
            items_per_page,
            previous_cursor,
            next_cursor,
            resources,
        })
    }
}

fn parse_schemas(obj: &Map<String, Value>) -> ScimResult<Vec<String>> {
    let raw = get_ignore_case(obj, "schemas")
        .and_then(Value::as_array)
        .ok_or_else(|| ScimError::invalid_syntax("list response requires a 'schemas' array"))?;
    raw.iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ScimError::invalid_syntax("'schemas' entries must be strings")
            })
        })
        .collect()
}

fn optional_u64(obj: &Map<String, Value>, name: &str) -> ScimResult<Option<u64>> {
    match get_ignore_case(obj, name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ScimError::invalid_syntax(format!("'{name}' must be a non-negative integer"))
        }),
    }
}

fn optional_string(obj: &Map<String, Value>, name: &str) -> ScimResult<Option<String>> {
    match get_ignore_case(obj, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ScimError::invalid_syntax(format!(
            "'{name}' must be a string, got {}",
            crate::value::type_name(other)
        ))),
    }
}

impl<T: Serialize> Serialize for ListResponse<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 2
            + usize::from(self.start_index.is_some())
            + usize::from(self.items_per_page.is_some())
            + usize::from(self.previous_cursor.is_some())
            + usize::from(self.next_cursor.is_some())
            + 1;
        let mut state = serializer.serialize_struct("ListResponse", len)?;
        state.serialize_field("schemas", &self.schemas)?;
        state.serialize_field("totalResults", &self.total_results)?;
        if let Some(start_index) = self.start_index {
            state.serialize_field("startIndex", &start_index)?;
        }
        if let Some(items_per_page) = self.items_per_page {
            state.serialize_field("itemsPerPage", &items_per_page)?;
        }
        if let Some(previous_cursor) = &self.previous_cursor {
            state.serialize_field("previousCursor", previous_cursor)?;
        }
        if let Some(next_cursor) = &self.next_cursor {
            state.serialize_field("nextCursor", next_cursor)?;
        }
        // Always the final property.
        state.serialize_field("Resources", &self.resources)?;
        state.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ListResponse<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
