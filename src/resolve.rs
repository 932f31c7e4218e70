//! # Per-View Resolution
//!
//! After merging, every view falls back to the `all` layer. [`ViewResolver`]
//! answers the two questions the emitters ask:
//!
//! - *What is the effective value of this key for this view?*
//!   ([`ViewResolver::get_value`]): the view's own value, else the `all`
//!   value. Null counts as unset.
//! - *What is the combined value of this additive key?*
//!   ([`ViewResolver::merged_list_value`]): the `all` value followed by the
//!   view's value. Used for `components`, `metas`, `http_metas`,
//!   `stylesheets` and `javascripts`.
//!
//! An empty view identifier means the general case and resolves straight
//! against `all`.

use serde_yaml::{Mapping, Value};

use crate::config::{ConfigTree, ALL_LAYER};

/// Read-only view of a merged configuration tree.
#[derive(Debug, Clone, Copy)]
pub struct ViewResolver<'a> {
    tree: &'a ConfigTree,
}

impl<'a> ViewResolver<'a> {
    pub fn new(tree: &'a ConfigTree) -> Self {
        Self { tree }
    }

    /// Effective value of `key` for `view_id`.
    pub fn get_value(&self, key: &str, view_id: &str) -> Option<&'a Value> {
        if is_specific(view_id) {
            if let Some(value) = self.local_value(key, view_id) {
                return Some(value);
            }
        }
        self.local_value(key, ALL_LAYER)
    }

    /// Whether the view's own entry sets `key`, even to null.
    pub fn has_local_key(&self, key: &str, view_id: &str) -> bool {
        self.tree
            .get(view_id)
            .is_some_and(|config| config.contains_key(key))
    }

    /// The `all` value of `key` combined with the view's value.
    ///
    /// Sequences are concatenated, `all` entries first. Mappings are merged
    /// key by key: a view key already present in `all` replaces that entry in
    /// place, new keys are appended. A sequence merged into a mapping adds
    /// its items under the next free numeric keys. Anything that is not a
    /// collection counts as empty. The result is an empty sequence when
    /// neither side contributes.
    pub fn merged_list_value(&self, key: &str, view_id: &str) -> Value {
        let mut merged = match self.local_value(key, ALL_LAYER) {
            Some(value) if value.is_sequence() || value.is_mapping() => value.clone(),
            _ => Value::Sequence(Vec::new()),
        };

        if is_specific(view_id) && view_id != ALL_LAYER {
            if let Some(extra) = self.local_value(key, view_id) {
                merged = append_merge(merged, extra);
            }
        }
        merged
    }

    fn local_value(&self, key: &str, view_id: &str) -> Option<&'a Value> {
        self.tree
            .get(view_id)
            .and_then(|config| config.get(key))
            .filter(|value| !value.is_null())
    }
}

fn is_specific(view_id: &str) -> bool {
    !view_id.is_empty()
}

fn append_merge(base: Value, extra: &Value) -> Value {
    match (base, extra) {
        (Value::Sequence(mut items), Value::Sequence(more)) => {
            items.extend(more.iter().cloned());
            Value::Sequence(items)
        }
        (Value::Mapping(mut map), Value::Mapping(more)) => {
            for (key, value) in more {
                map.insert(key.clone(), value.clone());
            }
            Value::Mapping(map)
        }
        (Value::Mapping(mut map), Value::Sequence(more)) => {
            append_indexed(&mut map, more);
            Value::Mapping(map)
        }
        (Value::Sequence(items), Value::Mapping(more)) => {
            let mut map = Mapping::new();
            append_indexed(&mut map, &items);
            for (key, value) in more {
                map.insert(key.clone(), value.clone());
            }
            Value::Mapping(map)
        }
        (base, _) => base,
    }
}

fn append_indexed(map: &mut Mapping, items: &[Value]) {
    let mut next = map
        .keys()
        .filter_map(Value::as_u64)
        .max()
        .map_or(0, |max| max + 1);
    for item in items {
        map.insert(Value::Number(next.into()), item.clone());
        next += 1;
    }
}

/// Iterate the `(key, value)` pairs of a merged collection.
///
/// Sequence items are keyed by their index.
pub fn entries(value: &Value) -> Vec<(Value, &Value)> {
    match value {
        Value::Mapping(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (Value::Number((i as u64).into()), v))
            .collect(),
        _ => Vec::new(),
    }
}
