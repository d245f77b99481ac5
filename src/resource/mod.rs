//! SCIM resource representations.
//!
//! Two layers, per the design split between algorithms and typed access:
//! [`ScimResource`] is the generic envelope the patch and diff engines
//! round-trip through (schemas, id, externalId, meta, attributes, and
//! URN-keyed extensions), while [`User`] and [`Group`] are the typed RFC
//! 7643 core resources with the EnterpriseUser extension.

mod group;
mod meta;
#[allow(clippy::module_inception)]
mod resource;
mod user;

pub use group::{Group, GroupMember};
pub use meta::Meta;
pub use resource::ScimResource;
pub use user::{Address, EnterpriseUser, Manager, MultiValuedAttribute, Name, User};

/// `schemas` URN of the core User resource.
pub const USER_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// `schemas` URN of the core Group resource.
pub const GROUP_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
/// `schemas` URN of the EnterpriseUser extension.
pub const ENTERPRISE_USER_URN: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
