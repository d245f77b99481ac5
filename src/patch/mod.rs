//! RFC 7644 PATCH semantics.
//!
//! The patch engine applies `add`, `replace`, and `remove` operations to a
//! JSON document. A request is a transaction at the resource level: the
//! engine works on a copy and hands back the new document, so a failing
//! operation leaves the caller's resource untouched.
//!
//! The delicate case is add-with-value-filter
//! (`addresses[type eq "home"].country`): the filter must be a single
//! equality on a direct sub-attribute, and the engine locates the matching
//! element, extends it, or synthesizes a new one carrying the filter's
//! sub-attribute as an implied discriminator.

pub mod walker;

use crate::error::{ScimError, ScimResult};
use crate::filter::{Filter, FilterEvaluator};
use crate::path::Path;
use crate::schema::{AttributeDefinition, SchemaRegistry};
use crate::value::{get_ignore_case, get_ignore_case_mut, values_equal};
use log::debug;
use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use walker::{NodePointer, Step};

/// Process-wide default for [`PatchOptions::append_new_patch_values`].
static APPEND_NEW_PATCH_VALUES: AtomicBool = AtomicBool::new(false);

/// Set the process-wide default for "append new patch values".
///
/// When enabled, an add-with-value-filter whose matched element already
/// carries the target sub-attribute appends a new element instead of
/// failing with a uniqueness error.
pub fn set_append_new_patch_values(enabled: bool) {
    APPEND_NEW_PATCH_VALUES.store(enabled, Ordering::SeqCst);
}

/// The current process-wide default for "append new patch values".
pub fn append_new_patch_values_default() -> bool {
    APPEND_NEW_PATCH_VALUES.load(Ordering::SeqCst)
}

/// Per-request patch behavior knobs.
///
/// The default reads the process-wide fallback; callers thread an explicit
/// value through when they need per-call control.
#[derive(Debug, Clone, Copy)]
pub struct PatchOptions {
    /// Append instead of rejecting when an add-with-value-filter hits an
    /// element that already has the target sub-attribute
    pub append_new_patch_values: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            append_new_patch_values: append_new_patch_values_default(),
        }
    }
}

/// The three PATCH operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOpKind {
    Add,
    Replace,
    Remove,
}

impl PatchOpKind {
    /// The wire keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOpKind::Add => "add",
            PatchOpKind::Replace => "replace",
            PatchOpKind::Remove => "remove",
        }
    }
}

/// A single PATCH operation.
///
/// `remove` requires a path; `add` and `replace` require a value. The wire
/// form accepts `op` in any case and property names case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOperation {
    pub op: PatchOpKind,
    pub path: Option<Path>,
    pub value: Option<Value>,
}

impl PatchOperation {
    /// An `add` operation.
    pub fn add(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Add,
            path,
            value: Some(value),
        }
    }

    /// A `replace` operation.
    pub fn replace(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path,
            value: Some(value),
        }
    }

    /// A `remove` operation.
    pub fn remove(path: Path) -> Self {
        Self {
            op: PatchOpKind::Remove,
            path: Some(path),
            value: None,
        }
    }
}

impl Serialize for PatchOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 1 + usize::from(self.path.is_some()) + usize::from(self.value.is_some());
        let mut state = serializer.serialize_struct("PatchOperation", len)?;
        state.serialize_field("op", self.op.as_str())?;
        if let Some(path) = &self.path {
            state.serialize_field("path", &path.to_string())?;
        }
        if let Some(value) = &self.value {
            state.serialize_field("value", value)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for PatchOperation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;

        let op = get_ignore_case(&raw, "op")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom("patch operation requires an 'op' string"))?;
        let op = match op.to_ascii_lowercase().as_str() {
            "add" => PatchOpKind::Add,
            "replace" => PatchOpKind::Replace,
            "remove" => PatchOpKind::Remove,
            other => return Err(D::Error::custom(format!("unknown patch op '{other}'"))),
        };

        let path = match get_ignore_case(&raw, "path") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(Path::from_str(s).map_err(D::Error::custom)?),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "patch path must be a string, got {}",
                    crate::value::type_name(other)
                )));
            }
        };

        let value = get_ignore_case(&raw, "value").cloned();

        Ok(PatchOperation { op, path, value })
    }
}

/// Applies PATCH operations to JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchExecutor<'a> {
    registry: Option<&'a SchemaRegistry>,
    options: PatchOptions,
}

impl<'a> PatchExecutor<'a> {
    /// A schemaless executor with default options.
    pub fn new() -> Self {
        Self {
            registry: None,
            options: PatchOptions::default(),
        }
    }

    /// An executor enforcing mutability and multi-valued characteristics
    /// from a schema registry.
    pub fn with_registry(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry: Some(registry),
            options: PatchOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: PatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply `operations` in order to a copy of `document`.
    ///
    /// Fails on the first bad operation; the input document is never
    /// modified.
    pub fn apply(&self, document: &Value, operations: &[PatchOperation]) -> ScimResult<Value> {
        if !document.is_object() {
            return Err(ScimError::invalid_value(
                "patch target must be a JSON object",
            ));
        }
        let mut working = document.clone();
        for operation in operations {
            self.apply_one(&mut working, operation)?;
        }
        Ok(working)
    }

    fn apply_one(&self, document: &mut Value, operation: &PatchOperation) -> ScimResult<()> {
        let path = match (&operation.path, self.registry) {
            (Some(p), Some(registry)) => Some(p.normalized(registry)),
            (Some(p), None) => Some(p.clone()),
            (None, _) => None,
        };
        debug!(
            "applying {} at {}",
            operation.op.as_str(),
            path.as_ref().map_or_else(|| "(root)".into(), Path::to_string)
        );

        if let Some(path) = &path {
            self.check_mutability(path)?;
        }

        match operation.op {
            PatchOpKind::Add => self.apply_add(document, path.as_ref(), operation.value.as_ref()),
            PatchOpKind::Replace => {
                self.apply_replace(document, path.as_ref(), operation.value.as_ref())
            }
            PatchOpKind::Remove => self.apply_remove(document, path.as_ref()),
        }
    }

    fn check_mutability(&self, path: &Path) -> ScimResult<()> {
        if let Some(registry) = self.registry
            && registry.is_read_only(path)
        {
            return Err(ScimError::mutability(format!(
                "attribute '{path}' is read-only"
            )));
        }
        Ok(())
    }

    fn attribute_definition(&self, path: &Path) -> Option<&'a AttributeDefinition> {
        self.registry.and_then(|r| r.resolve_attribute(path))
    }

    // ---- add -----------------------------------------------------------

    fn apply_add(
        &self,
        document: &mut Value,
        path: Option<&Path>,
        value: Option<&Value>,
    ) -> ScimResult<()> {
        let value = value
            .ok_or_else(|| ScimError::invalid_value("add operation requires a value"))?;
        if value.as_object().is_some_and(Map::is_empty) {
            return Err(ScimError::invalid_value(
                "add operation value must not be an empty object",
            ));
        }

        let Some(path) = path else {
            return self.merge_into_root(document, value, MergeMode::Add);
        };

        if path.has_value_filter() {
            return self.add_with_value_filter(document, path, value);
        }
        if path.is_root() {
            // Extension root: merge the value into the extension object.
            return self.merge_into_root_at(document, path.schema_urn(), value, MergeMode::Add);
        }

        self.mutate_leaf(document, path, |obj, name, def| {
            add_attribute(obj, name, value, def);
            Ok(())
        })
    }

    // ---- replace -------------------------------------------------------

    fn apply_replace(
        &self,
        document: &mut Value,
        path: Option<&Path>,
        value: Option<&Value>,
    ) -> ScimResult<()> {
        let value = value
            .ok_or_else(|| ScimError::invalid_value("replace operation requires a value"))?;
        if value.as_object().is_some_and(Map::is_empty) {
            return Err(ScimError::invalid_value(
                "replace operation value must not be an empty object",
            ));
        }

        let Some(path) = path else {
            return self.merge_into_root(document, value, MergeMode::Replace);
        };

        if path.has_value_filter() {
            return self.replace_with_value_filter(document, path, value);
        }
        if path.is_root() {
            return self.merge_into_root_at(document, path.schema_urn(), value, MergeMode::Replace);
        }

        // An empty-array value clears the attribute.
        if value.as_array().is_some_and(Vec::is_empty) {
            return self.remove_targets(document, path);
        }

        self.mutate_leaf(document, path, |obj, name, def| {
            let value = wrap_multi_valued(value, def);
            match get_ignore_case_mut(obj, name) {
                Some(slot) => *slot = value,
                None => {
                    obj.insert(name.to_string(), value);
                }
            }
            Ok(())
        })
    }

    fn replace_with_value_filter(
        &self,
        document: &mut Value,
        path: &Path,
        value: &Value,
    ) -> ScimResult<()> {
        let (prefix, rest) = split_at_filter(path)?;

        let mut targets = walker::locate(&prefix, document, self.registry);
        if targets.is_empty() {
            return Err(ScimError::no_target(format!(
                "path '{path}' did not match any value"
            )));
        }

        // An empty-array value removes the matched elements.
        if rest.is_empty() && value.as_array().is_some_and(Vec::is_empty) {
            walker::sort_for_removal(&mut targets);
            for pointer in &targets {
                walker::remove_at(document, pointer);
            }
            self.prune_empty_arrays(document, &targets);
            return Ok(());
        }

        for pointer in &targets {
            let element = walker::resolve_mut(document, pointer)
                .ok_or_else(|| ScimError::no_target(format!("path '{path}' vanished")))?;
            if rest.is_empty() {
                *element = value.clone();
                continue;
            }
            let obj = element.as_object_mut().ok_or_else(|| {
                ScimError::invalid_value(format!("'{path}' selects a non-complex value"))
            })?;
            set_nested(obj, &rest, value).map_err(|e| e.contextualize(path))?;
        }
        Ok(())
    }

    // ---- remove --------------------------------------------------------

    fn apply_remove(&self, document: &mut Value, path: Option<&Path>) -> ScimResult<()> {
        let path = path
            .ok_or_else(|| ScimError::invalid_path("remove operation requires a path"))?;
        if path.is_root() && path.schema_urn().is_none() {
            return Err(ScimError::invalid_path(
                "remove operation cannot target the whole resource",
            ));
        }
        self.remove_targets(document, path)
    }

    /// Remove everything `path` matches. Missing targets are a no-op.
    fn remove_targets(&self, document: &mut Value, path: &Path) -> ScimResult<()> {
        let mut targets = walker::locate(path, document, self.registry);
        walker::sort_for_removal(&mut targets);
        for pointer in &targets {
            walker::remove_at(document, pointer);
        }
        self.prune_empty_arrays(document, &targets);
        Ok(())
    }

    /// Removing the last element of a multi-valued attribute removes the
    /// attribute itself, not leave an empty array behind.
    fn prune_empty_arrays(&self, document: &mut Value, removed: &[NodePointer]) {
        let mut parents: Vec<NodePointer> = Vec::new();
        for pointer in removed {
            if matches!(pointer.last(), Some(Step::Index(_))) {
                let parent = pointer[..pointer.len() - 1].to_vec();
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
        }
        for parent in parents {
            if walker::resolve(document, &parent)
                .and_then(Value::as_array)
                .is_some_and(Vec::is_empty)
            {
                walker::remove_at(document, &parent);
            }
        }
    }

    // ---- add with value filter (RFC 7644 §3.5.2.1 edge) ----------------

    fn add_with_value_filter(
        &self,
        document: &mut Value,
        path: &Path,
        value: &Value,
    ) -> ScimResult<()> {
        let segments = path.segments();
        let first = &segments[0];
        let Some(filter) = first.value_filter() else {
            return Err(ScimError::invalid_path(format!(
                "value filter must be on the first segment of '{path}'"
            )));
        };
        if segments.iter().skip(1).any(|s| s.value_filter().is_some()) {
            return Err(ScimError::invalid_path(format!(
                "'{path}' carries more than one value filter"
            )));
        }
        match segments.len() {
            1 => {
                return Err(ScimError::invalid_path(format!(
                    "add with a value filter requires a target sub-attribute in '{path}'"
                )));
            }
            2 => {}
            _ => {
                return Err(ScimError::invalid_path(format!(
                    "'{path}' nests too deeply for an add with a value filter"
                )));
            }
        }
        let attr = first.attribute();
        let sub = segments[1].attribute();
        let (discriminator, literal) = equality_parts(filter).ok_or_else(|| {
            ScimError::invalid_filter(format!(
                "add with a value filter requires a single equality on a direct sub-attribute, got '{filter}'"
            ))
        })?;

        // A value filter is only meaningful on a multi-valued attribute.
        let attr_path = match path.schema_urn() {
            Some(urn) => Path::root_with_urn(urn)?.child(attr),
            None => Path::root().child(attr),
        };
        if let Some(def) = self.attribute_definition(&attr_path)
            && !def.multi_valued
        {
            return Err(ScimError::invalid_filter(format!(
                "value filter on single-valued attribute '{attr}'"
            )));
        }

        let container = self.container_mut(document, path.schema_urn())?;
        let key = match crate::value::find_key(container, attr) {
            Some(key) => key,
            None => {
                let key = attr.to_string();
                container.insert(key.clone(), Value::Array(Vec::new()));
                key
            }
        };
        let items = match container.get_mut(&key) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ScimError::invalid_filter(format!(
                    "value filter on single-valued attribute '{attr}'"
                )));
            }
        };

        let evaluator = match self.registry {
            Some(r) => FilterEvaluator::with_registry(r),
            None => FilterEvaluator::new(),
        };
        let matches: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| evaluator.matches(filter, item))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => {
                items.push(new_filtered_element(sub, value, discriminator, literal));
                Ok(())
            }
            [index] => {
                let element = items[*index].as_object_mut().ok_or_else(|| {
                    ScimError::invalid_value(format!(
                        "'{attr}' element matched by '{filter}' is not complex"
                    ))
                })?;
                if get_ignore_case(element, sub).is_some() {
                    if self.options.append_new_patch_values {
                        items.push(new_filtered_element(sub, value, discriminator, literal));
                        return Ok(());
                    }
                    return Err(ScimError::uniqueness(format!(
                        "'{attr}' already has a '{sub}' defined"
                    )));
                }
                element.insert(sub.to_string(), value.clone());
                // The discriminator is implied by the filter.
                if get_ignore_case(element, discriminator).is_none() {
                    element.insert(discriminator.to_string(), literal.clone());
                }
                Ok(())
            }
            _ => Err(ScimError::invalid_filter(format!(
                "'{attr}[{filter}]' matched more than one element"
            ))),
        }
    }

    // ---- shared navigation ---------------------------------------------

    /// The object to create top-level attributes in: the document root, or
    /// the extension object named by `urn` (created on demand).
    fn container_mut<'v>(
        &self,
        document: &'v mut Value,
        urn: Option<&str>,
    ) -> ScimResult<&'v mut Map<String, Value>> {
        let root = document
            .as_object_mut()
            .ok_or_else(|| ScimError::invalid_value("patch target must be a JSON object"))?;
        let Some(urn) = urn else {
            return Ok(root);
        };
        let key = crate::value::find_key(root, urn).unwrap_or_else(|| urn.to_string());
        let slot = root.entry(key).or_insert_with(|| Value::Object(Map::new()));
        slot.as_object_mut().ok_or_else(|| {
            ScimError::invalid_path(format!("extension '{urn}' is not an object"))
        })
    }

    /// Apply `mutate` to every container holding the path's final attribute,
    /// creating intermediate objects when nothing matches yet.
    fn mutate_leaf(
        &self,
        document: &mut Value,
        path: &Path,
        mutate: impl Fn(&mut Map<String, Value>, &str, Option<&AttributeDefinition>) -> ScimResult<()>,
    ) -> ScimResult<()> {
        let names: Vec<&str> = path.segments().iter().map(|s| s.attribute()).collect();
        let (last, parents) = names.split_last().expect("non-root path");
        let def = self.attribute_definition(path);

        // Existing parent containers first (arrays fan out per element).
        let mut parent_path = match path.schema_urn() {
            Some(urn) => Path::root_with_urn(urn)?,
            None => Path::root(),
        };
        for name in parents {
            parent_path = parent_path.child(*name);
        }
        let found = walker::locate(&parent_path, document, self.registry);
        if !found.is_empty() {
            let mut touched = false;
            for pointer in &found {
                let node = walker::resolve_mut(document, pointer).expect("located");
                match node {
                    Value::Object(obj) => {
                        mutate(obj, last, def)?;
                        touched = true;
                    }
                    Value::Array(items) => {
                        for item in items {
                            if let Value::Object(obj) = item {
                                mutate(obj, last, def)?;
                                touched = true;
                            }
                        }
                    }
                    _ => {
                        return Err(ScimError::invalid_path(format!(
                            "'{path}' dots a sub-attribute onto a non-complex value"
                        )));
                    }
                }
            }
            if touched {
                return Ok(());
            }
        }

        // Nothing there yet: build the object chain from the root.
        let mut container = self.container_mut(document, path.schema_urn())?;
        for name in parents {
            let key = crate::value::find_key(container, name).unwrap_or_else(|| name.to_string());
            let slot = container
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            container = match slot {
                Value::Object(_) => slot.as_object_mut().expect("object"),
                _ => {
                    return Err(ScimError::invalid_path(format!(
                        "'{path}' dots a sub-attribute onto a non-complex value"
                    )));
                }
            };
        }
        mutate(container, last, def)
    }

    /// Root-level add/replace: the value's fields merge into the document
    /// (or into the extension objects its URN-keyed fields name).
    fn merge_into_root(&self, document: &mut Value, value: &Value, mode: MergeMode) -> ScimResult<()> {
        let fields = value
            .as_object()
            .ok_or_else(|| {
                ScimError::invalid_value(format!(
                    "{} without a path requires an object value",
                    mode.verb()
                ))
            })?
            .clone();
        for (name, field_value) in &fields {
            if name.to_ascii_lowercase().starts_with("urn:") && field_value.is_object() {
                self.merge_into_root_at(document, Some(name.as_str()), field_value, mode)?;
                continue;
            }
            let attr_path = Path::root().child(name.clone());
            self.check_mutability(&attr_path)?;
            let def = self.attribute_definition(&attr_path);
            let root = self.container_mut(document, None)?;
            match mode {
                MergeMode::Add => add_attribute(root, name, field_value, def),
                MergeMode::Replace => replace_attribute(root, name, field_value),
            }
        }
        Ok(())
    }

    fn merge_into_root_at(
        &self,
        document: &mut Value,
        urn: Option<&str>,
        value: &Value,
        mode: MergeMode,
    ) -> ScimResult<()> {
        let fields = value
            .as_object()
            .ok_or_else(|| {
                ScimError::invalid_value(format!(
                    "{} at an extension root requires an object value",
                    mode.verb()
                ))
            })?
            .clone();
        let def_root = urn.and_then(|u| self.registry.and_then(|r| r.get_schema(u)));
        let container = self.container_mut(document, urn)?;
        for (name, field_value) in &fields {
            let def = def_root.and_then(|s| s.attribute(name));
            match mode {
                MergeMode::Add => add_attribute(container, name, field_value, def),
                MergeMode::Replace => replace_attribute(container, name, field_value),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum MergeMode {
    Add,
    Replace,
}

impl MergeMode {
    fn verb(&self) -> &'static str {
        match self {
            MergeMode::Add => "add",
            MergeMode::Replace => "replace",
        }
    }
}

impl ScimError {
    fn contextualize(self, path: &Path) -> ScimError {
        match self {
            ScimError::InvalidPath { detail } => {
                ScimError::invalid_path(format!("{detail} (at '{path}')"))
            }
            other => other,
        }
    }
}

/// Add semantics for one attribute slot.
///
/// Arrays append with structural de-duplication; objects merge
/// field-by-field; scalars replace. An empty-array value is a no-op, never
/// a clear.
fn add_attribute(
    obj: &mut Map<String, Value>,
    name: &str,
    value: &Value,
    def: Option<&AttributeDefinition>,
) {
    if value.as_array().is_some_and(Vec::is_empty) {
        return;
    }
    match get_ignore_case_mut(obj, name) {
        Some(Value::Array(items)) => match value {
            Value::Array(new_items) => {
                for item in new_items {
                    if !items.iter().any(|existing| values_equal(existing, item)) {
                        items.push(item.clone());
                    }
                }
            }
            single => {
                if !items.iter().any(|existing| values_equal(existing, single)) {
                    items.push(single.clone());
                }
            }
        },
        Some(Value::Object(existing)) if value.is_object() => {
            for (k, v) in value.as_object().expect("object") {
                let sub_def = def.and_then(|d| d.sub_attribute(k));
                add_attribute(existing, k, v, sub_def);
            }
        }
        Some(slot) => *slot = wrap_multi_valued(value, def),
        None => {
            obj.insert(name.to_string(), wrap_multi_valued(value, def));
        }
    }
}

/// Replace semantics for one attribute slot at the root: objects merge
/// sub-attribute-by-sub-attribute, everything else is overwritten.
fn replace_attribute(obj: &mut Map<String, Value>, name: &str, value: &Value) {
    match get_ignore_case_mut(obj, name) {
        Some(Value::Object(existing)) if value.is_object() => {
            for (k, v) in value.as_object().expect("object") {
                replace_attribute(existing, k, v);
            }
        }
        Some(slot) => *slot = value.clone(),
        None => {
            obj.insert(name.to_string(), value.clone());
        }
    }
}

/// Schema-informed shaping: a scalar written to a multi-valued attribute
/// lands as a one-element array.
fn wrap_multi_valued(value: &Value, def: Option<&AttributeDefinition>) -> Value {
    if def.is_some_and(|d| d.multi_valued) && !value.is_array() {
        Value::Array(vec![value.clone()])
    } else {
        value.clone()
    }
}

/// Set `names` under `obj`, creating intermediate objects.
fn set_nested(obj: &mut Map<String, Value>, names: &[&str], value: &Value) -> ScimResult<()> {
    let (last, parents) = names.split_last().expect("non-empty");
    let mut container = obj;
    for name in parents {
        let key = crate::value::find_key(container, name).unwrap_or_else(|| name.to_string());
        let slot = container
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        container = slot.as_object_mut().ok_or_else(|| {
            ScimError::invalid_path(format!("'{name}' is not a complex value"))
        })?;
    }
    match get_ignore_case_mut(container, last) {
        Some(slot) => *slot = value.clone(),
        None => {
            container.insert(last.to_string(), value.clone());
        }
    }
    Ok(())
}

/// Split a path at its (single) filtered segment: the prefix ends with the
/// filter, the rest is the trailing sub-attribute names.
fn split_at_filter(path: &Path) -> ScimResult<(Path, Vec<&str>)> {
    let segments = path.segments();
    let filtered: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.value_filter().is_some())
        .map(|(i, _)| i)
        .collect();
    let [position] = filtered.as_slice() else {
        return Err(ScimError::invalid_path(format!(
            "'{path}' must carry exactly one value filter"
        )));
    };
    let mut prefix = match path.schema_urn() {
        Some(urn) => Path::root_with_urn(urn)?,
        None => Path::root(),
    };
    for segment in &segments[..=*position] {
        prefix = match segment.value_filter() {
            Some(filter) => prefix.filtered_child(segment.attribute(), filter.clone()),
            None => prefix.child(segment.attribute()),
        };
    }
    let rest = segments[position + 1..]
        .iter()
        .map(|s| s.attribute())
        .collect();
    Ok((prefix, rest))
}

/// The `(subAttribute, literal)` of a plain equality filter, if that is
/// what `filter` is.
fn equality_parts(filter: &Filter) -> Option<(&str, &Value)> {
    let Filter::Equal(path, literal) = filter else {
        return None;
    };
    if path.schema_urn().is_some() || path.segments().len() != 1 {
        return None;
    }
    Some((path.segments()[0].attribute(), literal))
}

/// A synthesized element for an add-with-value-filter that matched nothing:
/// the target sub-attribute first, then the implied discriminator.
fn new_filtered_element(sub: &str, value: &Value, discriminator: &str, literal: &Value) -> Value {
    let mut element = Map::new();
    element.insert(sub.to_string(), value.clone());
    if !sub.eq_ignore_ascii_case(discriminator) && !literal.is_null() {
        element.insert(discriminator.to_string(), literal.clone());
    }
    Value::Object(element)
}
