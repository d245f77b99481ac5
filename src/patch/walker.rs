//! Path walker: locating the nodes a path refers to.
//!
//! The walker is the read/write substrate shared by the patch and diff
//! engines. [`locate`] resolves a [`Path`] against a document and returns a
//! concrete [`NodePointer`] for every match; the pointer identifies the
//! node's position from the root so the caller can read, overwrite, or
//! remove it through the resolve helpers. Pointers are only meaningful
//! against the document they were produced from, and only until it is
//! mutated.

use crate::filter::FilterEvaluator;
use crate::path::Path;
use crate::schema::SchemaRegistry;
use crate::value::find_key;
use serde_json::Value;

/// One step from a parent container to a child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Object member, stored spelling
    Key(String),
    /// Array element
    Index(usize),
}

/// A concrete location in a document, as steps from the root.
pub type NodePointer = Vec<Step>;

/// Resolve every node `path` matches in `root`.
///
/// Value-filter segments iterate the array at the attribute and keep the
/// elements satisfying the filter; a dotted segment after a multi-valued
/// attribute fans out over every element. Only existing nodes are returned;
/// creation is the patch engine's business.
pub fn locate(path: &Path, root: &Value, registry: Option<&SchemaRegistry>) -> Vec<NodePointer> {
    let evaluator = match registry {
        Some(r) => FilterEvaluator::with_registry(r),
        None => FilterEvaluator::new(),
    };

    let mut pointers: Vec<NodePointer> = vec![Vec::new()];

    if let Some(urn) = path.schema_urn() {
        pointers = pointers
            .into_iter()
            .filter_map(|ptr| {
                let obj = resolve(root, &ptr)?.as_object()?;
                let key = find_key(obj, urn)?;
                let mut next = ptr;
                next.push(Step::Key(key));
                Some(next)
            })
            .collect();
    }

    for segment in path.segments() {
        let mut next: Vec<NodePointer> = Vec::new();
        for ptr in &pointers {
            let Some(node) = resolve(root, ptr) else {
                continue;
            };
            // Navigate the attribute name, fanning out over array elements.
            let mut named: Vec<NodePointer> = Vec::new();
            match node {
                Value::Object(obj) => {
                    if let Some(key) = find_key(obj, segment.attribute()) {
                        let mut p = ptr.clone();
                        p.push(Step::Key(key));
                        named.push(p);
                    }
                }
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Object(obj) = item
                            && let Some(key) = find_key(obj, segment.attribute())
                        {
                            let mut p = ptr.clone();
                            p.push(Step::Index(i));
                            p.push(Step::Key(key));
                            named.push(p);
                        }
                    }
                }
                _ => {}
            }
            // Apply the segment's value filter over the array at the name.
            match segment.value_filter() {
                None => next.extend(named),
                Some(filter) => {
                    for ptr in named {
                        if let Some(Value::Array(items)) = resolve(root, &ptr) {
                            for (i, item) in items.iter().enumerate() {
                                if evaluator.matches(filter, item) {
                                    let mut p = ptr.clone();
                                    p.push(Step::Index(i));
                                    next.push(p);
                                }
                            }
                        }
                    }
                }
            }
        }
        pointers = next;
    }

    pointers
}

/// The node a pointer refers to.
pub fn resolve<'v>(root: &'v Value, pointer: &[Step]) -> Option<&'v Value> {
    let mut node = root;
    for step in pointer {
        node = match step {
            Step::Key(key) => node.as_object()?.get(key)?,
            Step::Index(i) => node.as_array()?.get(*i)?,
        };
    }
    Some(node)
}

/// Mutable access to the node a pointer refers to.
pub fn resolve_mut<'v>(root: &'v mut Value, pointer: &[Step]) -> Option<&'v mut Value> {
    let mut node = root;
    for step in pointer {
        node = match step {
            Step::Key(key) => node.as_object_mut()?.get_mut(key)?,
            Step::Index(i) => node.as_array_mut()?.get_mut(*i)?,
        };
    }
    Some(node)
}

/// Detach the node a pointer refers to from its parent container.
pub fn remove_at(root: &mut Value, pointer: &[Step]) -> Option<Value> {
    let (last, parent_steps) = pointer.split_last()?;
    let parent = resolve_mut(root, parent_steps)?;
    match last {
        Step::Key(key) => parent.as_object_mut()?.shift_remove(key),
        Step::Index(i) => {
            let items = parent.as_array_mut()?;
            if *i < items.len() {
                Some(items.remove(*i))
            } else {
                None
            }
        }
    }
}

/// Order pointers so that removing them one by one never invalidates the
/// rest: deepest first, and higher array indices before lower ones.
pub fn sort_for_removal(pointers: &mut [NodePointer]) {
    pointers.sort_by(|a, b| {
        b.len().cmp(&a.len()).then_with(|| {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = match (x, y) {
                    (Step::Index(i), Step::Index(j)) => j.cmp(i),
                    (Step::Key(p), Step::Key(q)) => p.cmp(q),
                    (Step::Key(_), Step::Index(_)) => std::cmp::Ordering::Less,
                    (Step::Index(_), Step::Key(_)) => std::cmp::Ordering::Greater,
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "userName": "bjensen",
            "name": {"givenName": "Barbara", "familyName": "Jensen"},
            "emails": [
                {"value": "bjensen@example.com", "type": "work"},
                {"value": "babs@jensen.org", "type": "home"}
            ],
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "department": "Tour Operations"
            }
        })
    }

    fn locate_str(path: &str, root: &Value) -> Vec<NodePointer> {
        locate(&path.parse().unwrap(), root, None)
    }

    #[test]
    fn test_locate_simple_attribute() {
        let root = doc();
        let found = locate_str("userName", &root);
        assert_eq!(found.len(), 1);
        assert_eq!(resolve(&root, &found[0]), Some(&json!("bjensen")));
    }

    #[test]
    fn test_locate_is_case_insensitive_but_preserves_spelling() {
        let root = doc();
        let found = locate_str("USERNAME", &root);
        assert_eq!(found[0], vec![Step::Key("userName".to_string())]);
    }

    #[test]
    fn test_locate_fans_out_over_array_elements() {
        let root = doc();
        let found = locate_str("emails.value", &root);
        assert_eq!(found.len(), 2);
        assert_eq!(resolve(&root, &found[1]), Some(&json!("babs@jensen.org")));
    }

    #[test]
    fn test_locate_with_value_filter() {
        let root = doc();
        let found = locate_str("emails[type eq \"work\"]", &root);
        assert_eq!(found.len(), 1);
        assert_eq!(
            resolve(&root, &found[0]).unwrap()["value"],
            json!("bjensen@example.com")
        );

        let sub = locate_str("emails[type eq \"home\"].value", &root);
        assert_eq!(sub.len(), 1);
        assert_eq!(resolve(&root, &sub[0]), Some(&json!("babs@jensen.org")));
    }

    #[test]
    fn test_locate_missing_yields_nothing() {
        let root = doc();
        assert!(locate_str("nickName", &root).is_empty());
        assert!(locate_str("emails[type eq \"other\"]", &root).is_empty());
        assert!(locate_str("name.missing", &root).is_empty());
    }

    #[test]
    fn test_locate_extension_attribute() {
        let root = doc();
        let path: Path =
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department"
                .parse()
                .unwrap();
        let found = locate(&path, &root, None);
        assert_eq!(found.len(), 1);
        assert_eq!(resolve(&root, &found[0]), Some(&json!("Tour Operations")));
    }

    #[test]
    fn test_remove_at() {
        let mut root = doc();
        let found = locate_str("emails[type eq \"work\"]", &root);
        let removed = remove_at(&mut root, &found[0]).unwrap();
        assert_eq!(removed["type"], json!("work"));
        assert_eq!(root["emails"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_sort_for_removal_orders_indices_descending() {
        let mut pointers = vec![
            vec![Step::Key("emails".into()), Step::Index(0)],
            vec![Step::Key("emails".into()), Step::Index(1)],
        ];
        sort_for_removal(&mut pointers);
        assert_eq!(pointers[0][1], Step::Index(1));
    }
}
