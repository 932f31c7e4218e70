//! Layer merging for view configurations
//!
//! A raw configuration has a `default` base layer and an `all` overlay.
//! Merging folds `default` into `all` so later stages only ever look at
//! `all` and the per-view entries.
//!
//! The merge runs in a fixed order, and each step is its own pure function:
//!
//! 1. [`merge_asset_lists`]: `stylesheets` and `javascripts` are concatenated
//!    (`default` entries first) into `all`, and removed from `default`.
//! 2. [`merge_default_layer`]: the generic [`yaml::deep_merge`] of `default`
//!    under `all`, after which `default` is removed.
//! 3. [`replace_tree_constants`]: `%NAME%` placeholders are substituted in
//!    every string value.
//!
//! Asset lists are concatenated before the generic merge because the generic
//! merge lets the overlay replace lists wholesale, which would drop the
//! default assets.

pub mod yaml;

use log::{debug, warn};
use serde_yaml::Value;

use crate::config::{ConfigTree, ALL_LAYER, DEFAULT_LAYER};
use crate::constants::{replace_in_mapping, ConstantResolver};
use yaml::{deep_merge, type_name};

/// Configuration keys whose lists are concatenated across layers.
pub const ASSET_LIST_KEYS: [&str; 2] = ["stylesheets", "javascripts"];

/// Run the full layer merge: asset lists, generic merge, constants.
pub fn merge_layers(raw: ConfigTree, constants: &dyn ConstantResolver) -> ConfigTree {
    let tree = merge_asset_lists(raw);
    let tree = merge_default_layer(tree);
    replace_tree_constants(tree, constants)
}

/// Concatenate `default.X ++ all.X` into `all.X` for each asset list key and
/// remove `default.X`.
///
/// Only sequences take part; any other value counts as an empty list. A key
/// that neither layer carries is not written.
pub fn merge_asset_lists(mut tree: ConfigTree) -> ConfigTree {
    for key in ASSET_LIST_KEYS {
        let from_default = tree
            .get_mut(DEFAULT_LAYER)
            .and_then(|layer| layer.shift_remove(key));
        let from_all = tree.all().and_then(|layer| layer.get(key)).cloned();

        if from_default.is_none() && from_all.is_none() {
            continue;
        }

        let mut combined = list_items(from_default.as_ref(), DEFAULT_LAYER, key);
        combined.extend(list_items(from_all.as_ref(), ALL_LAYER, key));
        debug!("Merged {} {} into '{}'", combined.len(), key, ALL_LAYER);

        tree.entry(ALL_LAYER)
            .insert(Value::String(key.to_string()), Value::Sequence(combined));
    }
    tree
}

fn list_items(value: Option<&Value>, layer: &str, key: &str) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items.clone(),
        Some(other) => {
            warn!(
                "'{}.{}' is a {}, not a list; ignoring it",
                layer,
                key,
                type_name(other)
            );
            Vec::new()
        }
    }
}

/// Deep-merge the `default` layer under `all` and drop `default`.
///
/// Afterwards the tree always has an `all` entry. A tree without `default`
/// keeps its `all` layer unchanged.
pub fn merge_default_layer(mut tree: ConfigTree) -> ConfigTree {
    let default = tree.remove(DEFAULT_LAYER).unwrap_or_default();
    let all = tree.get(ALL_LAYER).cloned().unwrap_or_default();

    if !default.is_empty() {
        debug!(
            "Folding {} key(s) from '{}' into '{}'",
            default.len(),
            DEFAULT_LAYER,
            ALL_LAYER
        );
    }

    tree.insert(ALL_LAYER, deep_merge(&default, &all));
    tree
}

/// Substitute constants in every string value of every view.
pub fn replace_tree_constants(tree: ConfigTree, constants: &dyn ConstantResolver) -> ConfigTree {
    tree.map_configs(|config| replace_in_mapping(config, constants))
}
