//! Diff engine: derive a minimal patch from two documents.
//!
//! `diff(source, target, include_removes)` produces operations whose
//! application to `source` yields `target`, up to dropping null and
//! empty-array nodes. Scalar updates are grouped into a single root
//! `replace`, additions into a root `add`, and multi-valued attributes are
//! diffed by element identity so an unchanged or merely reordered array
//! produces no operations.
//!
//! Array strategies are self-checked: the candidate operations for an array
//! attribute are test-applied against that subtree, and when they do not
//! reproduce the target (duplicated values, ambiguous element filters) the
//! engine falls back to replacing the whole array.

use crate::error::{ScimError, ScimResult};
use crate::filter::Filter;
use crate::patch::{PatchExecutor, PatchOperation};
use crate::path::Path;
use crate::value::{arrays_equal_unordered, get_ignore_case, is_null_or_empty, normalize, values_equal};
use serde_json::{Map, Value};

/// Sub-attributes that identify an element of a multi-valued complex
/// attribute across the two documents.
const IDENTIFYING_SUB_ATTRIBUTES: [&str; 3] = ["value", "type", "primary"];

/// Compute the patch operations transforming `source` into `target`.
///
/// When `include_removes` is false, attributes present only in `source` are
/// left alone, for clients sending partial updates. With it true, applying
/// the result to `source` yields a document equal to `target` after
/// normalization.
pub fn diff(source: &Value, target: &Value, include_removes: bool) -> ScimResult<Vec<PatchOperation>> {
    let source_obj = source
        .as_object()
        .ok_or_else(|| ScimError::invalid_value("diff source must be a JSON object"))?;
    let target_obj = target
        .as_object()
        .ok_or_else(|| ScimError::invalid_value("diff target must be a JSON object"))?;

    let mut additions = Map::new();
    let mut replacements = Map::new();
    let mut operations = Vec::new();
    let mut removes = Vec::new();

    diff_level(
        &Path::root(),
        source_obj,
        target_obj,
        include_removes,
        &mut additions,
        &mut replacements,
        &mut operations,
        &mut removes,
    );

    let mut result = Vec::new();
    if !replacements.is_empty() {
        // Fold additions into the grouped replace; replace without a path
        // creates missing attributes just like add.
        for (k, v) in additions {
            replacements.insert(k, v);
        }
        result.push(PatchOperation::replace(None, Value::Object(replacements)));
    } else if !additions.is_empty() {
        result.push(PatchOperation::add(None, Value::Object(additions)));
    }
    result.extend(operations);
    result.extend(removes.into_iter().map(PatchOperation::remove));
    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn diff_level(
    base: &Path,
    source: &Map<String, Value>,
    target: &Map<String, Value>,
    include_removes: bool,
    additions: &mut Map<String, Value>,
    replacements: &mut Map<String, Value>,
    operations: &mut Vec<PatchOperation>,
    removes: &mut Vec<Path>,
) {
    for (key, target_value) in target {
        let attr_path = attribute_path(base, key);
        let source_value = get_ignore_case(source, key);

        match source_value {
            None | Some(Value::Null) => {
                if !is_null_or_empty(target_value) {
                    additions.insert(key.clone(), target_value.clone());
                }
            }
            Some(source_value) if values_equal(source_value, target_value) => {}
            Some(Value::Array(source_items)) if target_value.is_array() => {
                let target_items = target_value.as_array().expect("array");
                diff_array(
                    &attr_path,
                    key,
                    source_items,
                    target_items,
                    include_removes,
                    replacements,
                    operations,
                    removes,
                );
            }
            Some(Value::Object(source_obj)) if target_value.is_object() => {
                let target_obj = target_value.as_object().expect("object");
                let mut child_adds = Map::new();
                let mut child_replaces = Map::new();
                diff_level(
                    &attr_path,
                    source_obj,
                    target_obj,
                    include_removes,
                    &mut child_adds,
                    &mut child_replaces,
                    operations,
                    removes,
                );
                if !child_replaces.is_empty() {
                    for (k, v) in child_adds {
                        child_replaces.insert(k, v);
                    }
                    replacements.insert(key.clone(), Value::Object(child_replaces));
                } else if !child_adds.is_empty() {
                    additions.insert(key.clone(), Value::Object(child_adds));
                }
            }
            Some(_) => {
                if is_null_or_empty(target_value) {
                    if include_removes {
                        removes.push(attr_path);
                    }
                } else {
                    replacements.insert(key.clone(), target_value.clone());
                }
            }
        }
    }

    if include_removes {
        for key in source.keys() {
            if get_ignore_case(target, key).is_none() && !is_null_or_empty(&source[key]) {
                removes.push(attribute_path(base, key));
            }
        }
    }
}

/// The path addressing `key` under `base`. A URN-shaped key at the document
/// root is an extension object and roots a schema-qualified path, so the
/// emitted operations stay wire-parseable.
fn attribute_path(base: &Path, key: &str) -> Path {
    if base.is_root()
        && base.schema_urn().is_none()
        && key.to_ascii_lowercase().starts_with("urn:")
        && let Ok(extension_root) = Path::root_with_urn(key)
    {
        return extension_root;
    }
    base.clone().child(key)
}

#[allow(clippy::too_many_arguments)]
fn diff_array(
    attr_path: &Path,
    key: &str,
    source: &[Value],
    target: &[Value],
    include_removes: bool,
    replacements: &mut Map<String, Value>,
    operations: &mut Vec<PatchOperation>,
    removes: &mut Vec<Path>,
) {
    // Order is not significant for array equality.
    if arrays_equal_unordered(source, target) {
        return;
    }
    if target.is_empty() {
        if include_removes {
            removes.push(attr_path.clone());
        }
        return;
    }

    let complex = source.iter().chain(target.iter()).any(Value::is_object);
    let candidate = if complex {
        diff_complex_array(attr_path, source, target, include_removes)
    } else {
        diff_simple_array(attr_path, source, target, include_removes)
    };

    match candidate {
        Some(ops) if !include_removes || replays_correctly(attr_path, source, target, &ops) => {
            for op in ops {
                match op.op {
                    crate::patch::PatchOpKind::Remove => {
                        removes.push(op.path.expect("remove carries a path"));
                    }
                    _ => operations.push(op),
                }
            }
        }
        _ => {
            // Element identity was ambiguous; replace the array wholesale.
            replacements.insert(key.to_string(), Value::Array(target.to_vec()));
        }
    }
}

/// Set-difference strategy for arrays of scalars.
fn diff_simple_array(
    attr_path: &Path,
    source: &[Value],
    target: &[Value],
    include_removes: bool,
) -> Option<Vec<PatchOperation>> {
    let added: Vec<Value> = target
        .iter()
        .filter(|t| !source.iter().any(|s| values_equal(s, t)))
        .cloned()
        .collect();
    let removed: Vec<&Value> = source
        .iter()
        .filter(|s| !target.iter().any(|t| values_equal(s, t)))
        .collect();

    let mut ops = Vec::new();
    if removed.is_empty() {
        if !added.is_empty() {
            ops.push(PatchOperation::add(
                Some(attr_path.clone()),
                Value::Array(added),
            ));
        }
    } else if added.is_empty() {
        // The array is otherwise unchanged: drop the lost values one by one.
        if include_removes {
            for value in removed {
                let filter = Filter::eq(Path::root().child("value"), value.clone());
                ops.push(PatchOperation::remove(
                    filtered(attr_path, filter)?,
                ));
            }
        }
    } else {
        // Values came and went: carry the whole target array.
        ops.push(PatchOperation::replace(
            Some(attr_path.clone()),
            Value::Array(target.to_vec()),
        ));
    }
    Some(ops)
}

/// Identity-matching strategy for arrays of complex elements.
fn diff_complex_array(
    attr_path: &Path,
    source: &[Value],
    target: &[Value],
    include_removes: bool,
) -> Option<Vec<PatchOperation>> {
    let mut source_left: Vec<&Value> = source.iter().collect();
    let mut new_elements: Vec<Value> = Vec::new();
    let mut ops = Vec::new();

    for target_element in target {
        // Exact matches first.
        if let Some(pos) = source_left
            .iter()
            .position(|s| values_equal(s, target_element))
        {
            source_left.remove(pos);
            continue;
        }

        let Some(target_obj) = target_element.as_object() else {
            // A scalar in a complex array never near-matches anything.
            new_elements.push(target_element.clone());
            continue;
        };

        // Best near match by shared structure, anchored on the
        // identifying sub-attributes.
        let mut best: Option<(usize, usize)> = None;
        for (i, source_element) in source_left.iter().enumerate() {
            let Some(source_obj) = source_element.as_object() else {
                continue;
            };
            if !identifying_agree(source_obj, target_obj) {
                continue;
            }
            let score = similarity(source_obj, target_obj);
            if score > 0 && best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        match best {
            Some((pos, _)) => {
                let source_obj = source_left[pos].as_object().expect("matched object");
                let filter = identity_filter(source_obj, target_obj)?;
                let element_path = filtered(attr_path, filter)?;

                let changed: Map<String, Value> = target_obj
                    .iter()
                    .filter(|(k, v)| {
                        !get_ignore_case(source_obj, k).is_some_and(|s| values_equal(s, v))
                    })
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                let dropped: Vec<&String> = source_obj
                    .keys()
                    .filter(|k| get_ignore_case(target_obj, k).is_none())
                    .collect();

                if changed.is_empty() {
                    if include_removes {
                        for sub in dropped {
                            ops.push(PatchOperation::remove(element_path.clone().child(sub.clone())));
                        }
                    }
                } else {
                    // Sub-attributes changed; carry the full target element.
                    ops.push(PatchOperation::replace(
                        Some(element_path),
                        target_element.clone(),
                    ));
                }
                source_left.remove(pos);
            }
            None => new_elements.push(target_element.clone()),
        }
    }

    if !new_elements.is_empty() {
        ops.push(PatchOperation::add(
            Some(attr_path.clone()),
            Value::Array(new_elements),
        ));
    }

    if include_removes {
        for leftover in source_left {
            let obj = leftover.as_object()?;
            let filter = identity_filter(obj, obj)?;
            ops.push(PatchOperation::remove(filtered(attr_path, filter)?));
        }
    }

    Some(ops)
}

/// The identifying sub-attributes present in both elements must agree.
fn identifying_agree(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    let mut shared = false;
    for key in IDENTIFYING_SUB_ATTRIBUTES {
        match (get_ignore_case(a, key), get_ignore_case(b, key)) {
            (Some(x), Some(y)) => {
                if !values_equal(x, y) {
                    return false;
                }
                shared = true;
            }
            _ => {}
        }
    }
    shared
}

fn similarity(a: &Map<String, Value>, b: &Map<String, Value>) -> usize {
    b.iter()
        .filter(|(k, v)| get_ignore_case(a, k).is_some_and(|x| values_equal(x, v)))
        .count()
}

/// An equality filter pinning down one element, built from the identifying
/// sub-attributes it carries (all scalar sub-attributes as a fallback).
fn identity_filter(element: &Map<String, Value>, other: &Map<String, Value>) -> Option<Filter> {
    let mut clauses: Vec<Filter> = IDENTIFYING_SUB_ATTRIBUTES
        .iter()
        .filter_map(|key| {
            let a = get_ignore_case(element, key)?;
            let b = get_ignore_case(other, key)?;
            (values_equal(a, b) && !a.is_object() && !a.is_array())
                .then(|| Filter::eq(Path::root().child(*key), a.clone()))
        })
        .collect();
    if clauses.is_empty() {
        clauses = element
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array() && !v.is_null())
            .map(|(k, v)| Filter::eq(Path::root().child(k.clone()), v.clone()))
            .collect();
    }
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(Filter::and(clauses)),
    }
}

/// `attr_path` with a value filter attached to its final segment.
fn filtered(attr_path: &Path, filter: Filter) -> Option<Path> {
    let (last, parents) = attr_path.segments().split_last()?;
    let mut path = match attr_path.schema_urn() {
        Some(urn) => Path::root_with_urn(urn).ok()?,
        None => Path::root(),
    };
    for segment in parents {
        path = path.child(segment.attribute());
    }
    Some(path.filtered_child(last.attribute(), filter))
}

/// Test-apply candidate array operations against the subtree they target
/// and check they reproduce the target array (as a multiset).
fn replays_correctly(
    attr_path: &Path,
    source: &[Value],
    target: &[Value],
    ops: &[PatchOperation],
) -> bool {
    // Rebuild the nesting the operation paths expect.
    let names: Vec<String> = attr_path
        .segments()
        .iter()
        .map(|s| s.attribute().to_string())
        .collect();
    let mut doc = Value::Array(source.to_vec());
    for name in names.iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert(name.clone(), doc);
        doc = Value::Object(wrapper);
    }
    if let Some(urn) = attr_path.schema_urn() {
        let mut wrapper = Map::new();
        wrapper.insert(urn.to_string(), doc);
        doc = Value::Object(wrapper);
    }

    let Ok(patched) = PatchExecutor::new().apply(&doc, ops) else {
        return false;
    };
    let mut node = &patched;
    if let Some(urn) = attr_path.schema_urn() {
        match node.as_object().and_then(|o| get_ignore_case(o, urn)) {
            Some(v) => node = v,
            None => return target.iter().all(is_null_or_empty),
        }
    }
    for name in &names {
        match node.as_object().and_then(|o| get_ignore_case(o, name)) {
            Some(v) => node = v,
            // The attribute vanished: fine iff the target is empty.
            None => return target.iter().all(is_null_or_empty),
        }
    }
    match node {
        Value::Array(items) => {
            let got: Vec<Value> = items.iter().map(normalize).collect();
            let want: Vec<Value> = target.iter().map(normalize).collect();
            arrays_equal_unordered(&got, &want)
        }
        _ => false,
    }
}
