//! Typed core User resource and the EnterpriseUser extension.

use super::{ENTERPRISE_USER_URN, Meta, USER_URN};
use crate::error::ScimResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The components of the user's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honorific_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honorific_suffix: Option<String>,
}

/// The standard shape of multi-valued attribute elements (emails,
/// phoneNumbers, ims, photos, groups, entitlements, roles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MultiValuedAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl MultiValuedAttribute {
    /// An element with just a value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// An element with a value and canonical type.
    pub fn with_type(value: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            type_: Some(type_.into()),
            ..Self::default()
        }
    }
}

/// A physical mailing address element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

/// The user's manager, from the EnterpriseUser extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The EnterpriseUser extension attributes (RFC 7643 §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Manager>,
}

/// The core User resource (RFC 7643 §4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<MultiValuedAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<MultiValuedAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<MultiValuedAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<MultiValuedAttribute>,
    #[serde(
        rename = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enterprise: Option<EnterpriseUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl User {
    /// A new User with the core schema declared.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![USER_URN.to_string()],
            id: None,
            external_id: None,
            user_name: user_name.into(),
            name: None,
            display_name: None,
            nick_name: None,
            profile_url: None,
            title: None,
            user_type: None,
            preferred_language: None,
            locale: None,
            timezone: None,
            active: None,
            password: None,
            emails: Vec::new(),
            phone_numbers: Vec::new(),
            photos: Vec::new(),
            addresses: Vec::new(),
            groups: Vec::new(),
            enterprise: None,
            meta: None,
        }
    }

    /// Attach the EnterpriseUser extension, declaring its URN.
    pub fn with_enterprise(mut self, enterprise: EnterpriseUser) -> Self {
        if !self
            .schemas
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ENTERPRISE_USER_URN))
        {
            self.schemas.push(ENTERPRISE_USER_URN.to_string());
        }
        self.enterprise = Some(enterprise);
        self
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
    fn test_full_round_trip() {
        let raw = json!({
            "schemas": [USER_URN, ENTERPRISE_USER_URN],
            "id": "2819c223",
            "userName": "bjensen@example.com",
            "name": {"givenName": "Barbara", "familyName": "Jensen"},
            "active": true,
            "emails": [
                {"value": "bjensen@example.com", "type": "work", "primary": true}
            ],
            "addresses": [
                {"type": "work", "streetAddress": "100 Universal City Plaza",
                 "locality": "Hollywood", "region": "CA", "postalCode": "91608",
                 "country": "USA"}
            ],
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "employeeNumber": "701984",
                "manager": {"value": "26118915", "displayName": "John Smith"}
            },
            "meta": {"resourceType": "User", "created": "2010-01-23T04:56:22Z"}
        });
        let user = User::from_value(&raw).unwrap();
        assert_eq!(user.user_name, "bjensen@example.com");
        assert_eq!(user.emails[0].type_.as_deref(), Some("work"));
        assert_eq!(
            user.enterprise.as_ref().unwrap().employee_number.as_deref(),
            Some("701984")
        );
        assert_eq!(
            user.addresses[0].street_address.as_deref(),
            Some("100 Universal City Plaza")
        );

        assert_eq!(user.to_value().unwrap(), raw);
    }

    #[test]
    fn test_empty_collections_omitted() {
        let user = User::new("bjensen");
        let value = user.to_value().unwrap();
        assert!(value.get("emails").is_none());
        assert!(value.get("addresses").is_none());
        assert!(value.get("active").is_none());
    }

    #[test]
    fn test_built_multi_valued_elements() {
        let mut user = User::new("bjensen");
        user.emails.push(MultiValuedAttribute::with_type("bjensen@example.com", "work"));
        user.phone_numbers.push(MultiValuedAttribute::new("555-555-5555"));
        let value = user.to_value().unwrap();
        assert_eq!(
            value["emails"],
            json!([{"value": "bjensen@example.com", "type": "work"}])
        );
        assert_eq!(value["phoneNumbers"], json!([{"value": "555-555-5555"}]));
    }

    #[test]
    fn test_with_enterprise_declares_schema() {
        let user = User::new("bjensen").with_enterprise(EnterpriseUser {
            department: Some("Tour Operations".to_string()),
            ..EnterpriseUser::default()
        });
        assert_eq!(user.schemas.len(), 2);
        let value = user.to_value().unwrap();
        assert_eq!(
            value[ENTERPRISE_USER_URN]["department"],
            json!("Tour Operations")
        );
    }
}
