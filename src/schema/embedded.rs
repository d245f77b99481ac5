//! Embedded core SCIM schemas.
//!
//! This module provides the RFC 7643 core User and Group schemas plus the
//! EnterpriseUser extension as static JSON, so schema-informed evaluation
//! works without any external schema files. Additional or replacement
//! schemas can be registered on the registry at runtime.

/// Returns the core User schema as a JSON string.
pub fn core_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:User",
  "name": "User",
  "description": "User Account",
  "attributes": [
    {
      "name": "id",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "always",
      "uniqueness": "server"
    },
    {
      "name": "externalId",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "none"
    },
    {
      "name": "userName",
      "type": "string",
      "multiValued": false,
      "required": true,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "server"
    },
    {
      "name": "name",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "formatted", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "familyName", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "givenName", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "middleName", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "honorificPrefix", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "honorificSuffix", "type": "string", "multiValued": false, "caseExact": false}
      ]
    },
    {
      "name": "displayName",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "nickName",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "profileUrl",
      "type": "reference",
      "referenceTypes": ["external"],
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "title",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "userType",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "preferredLanguage",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "locale",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "timezone",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "active",
      "type": "boolean",
      "multiValued": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "password",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "writeOnly",
      "returned": "never"
    },
    {
      "name": "emails",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["work", "home", "other"]},
        {"name": "primary", "type": "boolean", "multiValued": false}
      ]
    },
    {
      "name": "phoneNumbers",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["work", "home", "mobile", "fax", "pager", "other"]},
        {"name": "primary", "type": "boolean", "multiValued": false}
      ]
    },
    {
      "name": "photos",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "reference", "referenceTypes": ["external"],
         "multiValued": false, "caseExact": false},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["photo", "thumbnail"]},
        {"name": "primary", "type": "boolean", "multiValued": false}
      ]
    },
    {
      "name": "addresses",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "formatted", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "streetAddress", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "locality", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "region", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "postalCode", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "country", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["work", "home", "other"]},
        {"name": "primary", "type": "boolean", "multiValued": false}
      ]
    },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "string", "multiValued": false, "caseExact": false,
         "mutability": "readOnly"},
        {"name": "$ref", "type": "reference", "referenceTypes": ["User", "Group"],
         "multiValued": false, "caseExact": false, "mutability": "readOnly"},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false,
         "mutability": "readOnly"},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["direct", "indirect"], "mutability": "readOnly"}
      ]
    },
    {
      "name": "x509Certificates",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "binary", "multiValued": false, "caseExact": true},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "primary", "type": "boolean", "multiValued": false}
      ]
    },
    {
      "name": "meta",
      "type": "complex",
      "multiValued": false,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        {"name": "resourceType", "type": "string", "multiValued": false, "caseExact": true,
         "mutability": "readOnly"},
        {"name": "created", "type": "dateTime", "multiValued": false, "mutability": "readOnly"},
        {"name": "lastModified", "type": "dateTime", "multiValued": false, "mutability": "readOnly"},
        {"name": "location", "type": "reference", "referenceTypes": ["uri"],
         "multiValued": false, "caseExact": true, "mutability": "readOnly"},
        {"name": "version", "type": "string", "multiValued": false, "caseExact": true,
         "mutability": "readOnly"}
      ]
    }
  ]
}"#
}

/// Returns the core Group schema as a JSON string.
pub fn core_group_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:Group",
  "name": "Group",
  "description": "Group",
  "attributes": [
    {
      "name": "id",
      "type": "string",
      "multiValued": false,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "always",
      "uniqueness": "server"
    },
    {
      "name": "displayName",
      "type": "string",
      "multiValued": false,
      "required": true,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "members",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "string", "multiValued": false, "caseExact": false,
         "mutability": "immutable"},
        {"name": "$ref", "type": "reference", "referenceTypes": ["User", "Group"],
         "multiValued": false, "caseExact": false, "mutability": "immutable"},
        {"name": "display", "type": "string", "multiValued": false, "caseExact": false,
         "mutability": "immutable"},
        {"name": "type", "type": "string", "multiValued": false, "caseExact": false,
         "canonicalValues": ["User", "Group"], "mutability": "immutable"}
      ]
    }
  ]
}"#
}

/// Returns the EnterpriseUser extension schema as a JSON string.
pub fn enterprise_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
  "name": "EnterpriseUser",
  "description": "Enterprise User",
  "attributes": [
    {
      "name": "employeeNumber",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "costCenter",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "organization",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "division",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "department",
      "type": "string",
      "multiValued": false,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "manager",
      "type": "complex",
      "multiValued": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        {"name": "value", "type": "string", "multiValued": false, "caseExact": false},
        {"name": "$ref", "type": "reference", "referenceTypes": ["User"],
         "multiValued": false, "caseExact": false},
        {"name": "displayName", "type": "string", "multiValued": false, "caseExact": false,
         "mutability": "readOnly"}
      ]
    }
  ]
}"#
}
