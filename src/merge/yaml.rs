//! Generic YAML record merging
//!
//! This module provides the deep-merge utility the layer merger and the file
//! loader share. It knows nothing about views; it merges two YAML mappings.
//!
//! ## Rules
//!
//! - Keys present on one side only are copied through.
//! - Keys present on both sides whose values are both mappings are merged
//!   recursively.
//! - Any other collision is won by the overlay value. Sequences are *not*
//!   concatenated here; callers that want list concatenation do it before
//!   merging.
//!
//! Keys from the base come first, in base order, followed by keys that only
//! the overlay has, in overlay order.
//!
//! ## Example
//!
//! ```
//! use view_config::merge::yaml::deep_merge;
//! use serde_yaml::Mapping;
//!
//! let base: Mapping = serde_yaml::from_str("a: 1\nnested: {x: 1, y: 2}").unwrap();
//! let overlay: Mapping = serde_yaml::from_str("nested: {y: 3}\nb: 2").unwrap();
//! let merged = deep_merge(&base, &overlay);
//!
//! let expected: Mapping = serde_yaml::from_str("a: 1\nnested: {x: 1, y: 3}\nb: 2").unwrap();
//! assert_eq!(merged, expected);
//! ```

use log::trace;
use serde_yaml::{Mapping, Value as YamlValue};

/// Deep-merge `overlay` on top of `base`, returning a new mapping.
pub fn deep_merge(base: &Mapping, overlay: &Mapping) -> Mapping {
    merge_at(base, overlay, "")
}

fn merge_at(base: &Mapping, overlay: &Mapping, path: &str) -> Mapping {
    let mut merged = Mapping::with_capacity(base.len() + overlay.len());

    for (key, base_value) in base {
        let value = match overlay.get(key) {
            Some(overlay_value) => match (base_value, overlay_value) {
                (YamlValue::Mapping(base_map), YamlValue::Mapping(overlay_map)) => {
                    let child = child_path(path, key);
                    YamlValue::Mapping(merge_at(base_map, overlay_map, &child))
                }
                _ => {
                    trace!(
                        "Overlay wins at '{}': {} -> {}",
                        child_path(path, key),
                        type_name(base_value),
                        type_name(overlay_value)
                    );
                    overlay_value.clone()
                }
            },
            None => base_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    for (key, overlay_value) in overlay {
        if !base.contains_key(key) {
            merged.insert(key.clone(), overlay_value.clone());
        }
    }

    merged
}

fn child_path(path: &str, key: &YamlValue) -> String {
    let key_str = match key {
        YamlValue::String(s) => s.clone(),
        _ => format!("{:?}", key),
    };
    if path.is_empty() {
        key_str
    } else {
        format!("{}.{}", path, key_str)
    }
}

/// Get a human-readable type name for a YAML value
///
/// Used for logging and error messages to describe the type of a value.
pub fn type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}
