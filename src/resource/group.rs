//! Typed core Group resource.

use super::{GROUP_URN, Meta};
use crate::error::ScimResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A member of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl GroupMember {
    /// A member referencing the resource with `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            value: Some(id.into()),
            ..Self::default()
        }
    }
}

/// The core Group resource (RFC 7643 §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GroupMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Group {
    /// A new Group with the core schema declared.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![GROUP_URN.to_string()],
            id: None,
            external_id: None,
            display_name: display_name.into(),
            members: Vec::new(),
            meta: None,
        }
    }

    /// The JSON document form the engines operate on.
    pub fn to_value(&self) -> ScimResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build from a JSON document.
    pub fn from_value(value: &Value) -> ScimResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let raw = json!({
            "schemas": [GROUP_URN],
            "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
            "displayName": "Tour Guides",
            "members": [
                {"value": "2819c223", "$ref": "https://example.com/v2/Users/2819c223",
                 "display": "Babs Jensen"}
            ]
        });
        let group = Group::from_value(&raw).unwrap();
        assert_eq!(group.display_name, "Tour Guides");
        assert_eq!(group.members[0].display.as_deref(), Some("Babs Jensen"));
        assert_eq!(group.to_value().unwrap(), raw);
    }

    #[test]
    fn test_empty_members_omitted() {
        let group = Group::new("Empty Group");
        let value = group.to_value().unwrap();
        assert!(value.get("members").is_none());
    }

    #[test]
    fn test_built_members_serialize() {
        let mut group = Group::new("Tour Guides");
        group.members.push(GroupMember::new("2819c223"));
        let value = group.to_value().unwrap();
        assert_eq!(value["members"], json!([{"value": "2819c223"}]));
    }
}
