//! The process-wide "append new patch values" fallback.
//!
//! Kept in its own test binary: the setting is process-global, and the
//! other suites rely on the default being off.

use scim2_core::patch::{
    PatchExecutor, append_new_patch_values_default, set_append_new_patch_values,
};
use scim2_core::{ScimError, PatchOperation};
use serde_json::json;

#[test]
fn process_wide_default_feeds_new_executors() {
    let resource = json!({
        "addresses": [{"type": "home", "streetAddress": "8 Mile Rd."}]
    });
    let operations = [serde_json::from_value::<PatchOperation>(json!({
        "op": "add",
        "path": "addresses[type eq \"home\"].streetAddress",
        "value": "7 Mile Rd."
    }))
    .unwrap()];

    assert!(!append_new_patch_values_default());
    let err = PatchExecutor::new().apply(&resource, &operations).unwrap_err();
    assert!(matches!(err, ScimError::Uniqueness { .. }));

    set_append_new_patch_values(true);
    assert!(append_new_patch_values_default());
    let patched = PatchExecutor::new().apply(&resource, &operations).unwrap();
    assert_eq!(patched["addresses"].as_array().unwrap().len(), 2);

    set_append_new_patch_values(false);
}
