//! Generic SCIM resource envelope.

use super::Meta;
use crate::error::{ScimError, ScimResult};
use crate::messages::PatchRequest;
use crate::value::{get_ignore_case, remove_ignore_case};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A SCIM resource as the algorithms see it: common attributes split out,
/// everything else kept as JSON, extensions keyed by their schema URN.
///
/// The `schemas` list always contains the core schema plus every extension
/// present; [`ScimResource::set_extension`] and the deserializer maintain
/// that invariant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScimResource {
    pub schemas: Vec<String>,
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub meta: Option<Meta>,
    /// Core attributes, in document order
    pub attributes: Map<String, Value>,
    /// Extension objects keyed by schema URN
    pub extensions: Map<String, Value>,
}

impl ScimResource {
    /// An empty resource declaring `core_schema`.
    pub fn new(core_schema: impl Into<String>) -> Self {
        Self {
            schemas: vec![core_schema.into()],
            ..Self::default()
        }
    }

    /// Build from a JSON document.
    ///
    /// `schemas` is required; URN-keyed top-level objects become
    /// extensions, and any extension URN missing from `schemas` is added
    /// to keep the envelope consistent.
    pub fn from_value(value: &Value) -> ScimResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ScimError::invalid_syntax("resource must be a JSON object"))?;
        let mut rest = obj.clone();

        let schemas_value = remove_ignore_case(&mut rest, "schemas")
            .ok_or_else(|| ScimError::invalid_syntax("resource requires a 'schemas' attribute"))?;
        let mut schemas: Vec<String> = schemas_value
            .as_array()
            .ok_or_else(|| ScimError::invalid_syntax("'schemas' must be an array"))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ScimError::invalid_syntax("'schemas' entries must be strings"))
            })
            .collect::<ScimResult<_>>()?;
        if schemas.is_empty() {
            return Err(ScimError::invalid_syntax("'schemas' must not be empty"));
        }

        let id = match remove_ignore_case(&mut rest, "id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(ScimError::invalid_syntax("'id' must be a string")),
        };
        let external_id = match remove_ignore_case(&mut rest, "externalId") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(ScimError::invalid_syntax("'externalId' must be a string")),
        };
        let meta = match remove_ignore_case(&mut rest, "meta") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value(raw)?),
        };

        let mut attributes = Map::new();
        let mut extensions = Map::new();
        for (key, value) in rest {
            if key.to_ascii_lowercase().starts_with("urn:") {
                if !schemas.iter().any(|s| s.eq_ignore_ascii_case(&key)) {
                    schemas.push(key.clone());
                }
                extensions.insert(key, value);
            } else {
                attributes.insert(key, value);
            }
        }

        Ok(Self {
            schemas,
            id,
            external_id,
            meta,
            attributes,
            extensions,
        })
    }

    /// Serialize back to a JSON document.
    ///
    /// Emission order: `schemas`, `id`, `externalId`, core attributes in
    /// their stored order, `meta`, then extension objects.
    pub fn to_value(&self) -> ScimResult<Value> {
        let mut out = Map::new();
        out.insert(
            "schemas".to_string(),
            Value::Array(self.schemas.iter().cloned().map(Value::String).collect()),
        );
        if let Some(id) = &self.id {
            out.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(external_id) = &self.external_id {
            out.insert("externalId".to_string(), Value::String(external_id.clone()));
        }
        for (key, value) in &self.attributes {
            out.insert(key.clone(), value.clone());
        }
        if let Some(meta) = &self.meta {
            out.insert("meta".to_string(), serde_json::to_value(meta)?);
        }
        for (urn, value) in &self.extensions {
            out.insert(urn.clone(), value.clone());
        }
        Ok(Value::Object(out))
    }

    /// A core attribute by case-insensitive name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        get_ignore_case(&self.attributes, name)
    }

    /// Set a core attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match crate::value::find_key(&self.attributes, &name) {
            Some(key) => {
                self.attributes.insert(key, value);
            }
            None => {
                self.attributes.insert(name, value);
            }
        }
    }

    /// An extension object by case-insensitive URN.
    pub fn extension(&self, urn: &str) -> Option<&Value> {
        get_ignore_case(&self.extensions, urn)
    }

    /// Set an extension object, registering its URN in `schemas`.
    pub fn set_extension(&mut self, urn: impl Into<String>, value: Value) {
        let urn = urn.into();
        if !self.schemas.iter().any(|s| s.eq_ignore_ascii_case(&urn)) {
            self.schemas.push(urn.clone());
        }
        self.extensions.insert(urn, value);
    }

    /// Apply a PATCH request, returning the patched resource.
    ///
    /// The receiver is untouched; patching works on the JSON form and
    /// re-validates the envelope afterwards.
    pub fn patched(&self, request: &PatchRequest) -> ScimResult<ScimResource> {
        let document = self.to_value()?;
        let patched = request.apply(&document)?;
        Self::from_value(&patched)
    }
}

impl Serialize for ScimResource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScimResource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
