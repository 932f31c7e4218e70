//! Property-based tests for the asset list compiler and layer merging.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use crate::assets::{compile_assets, AssetKind};
    use crate::codegen::ir::Statement;
    use crate::merge::yaml::deep_merge;
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value};

    fn directive() -> impl Strategy<Value = String> {
        prop_oneof![
            6 => "[a-e]",
            3 => "-[a-e]",
            1 => Just("-*".to_string()),
        ]
    }

    fn asset_list() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(directive(), 0..24)
    }

    fn values(items: &[String]) -> Vec<Value> {
        items.iter().cloned().map(Value::String).collect()
    }

    fn names(statements: &[Statement]) -> Vec<String> {
        statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::AddAsset { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn flat_mapping() -> impl Strategy<Value = Mapping> {
        prop::collection::vec(("[a-f]", "[a-z]{0,4}"), 0..8).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(key, value)| (Value::String(key), Value::String(value)))
                .collect()
        })
    }

    proptest! {
        /// Property: every asset is emitted at most once
        #[test]
        fn compiled_assets_have_unique_names(items in asset_list()) {
            let out = names(&compile_assets(AssetKind::Stylesheet, &values(&items)));
            let unique: HashSet<&String> = out.iter().collect();
            prop_assert_eq!(unique.len(), out.len());
        }

        /// Property: only names that were added can be emitted
        #[test]
        fn compiled_assets_come_from_input(items in asset_list()) {
            let added: HashSet<&str> = items
                .iter()
                .map(String::as_str)
                .filter(|item| !item.starts_with('-'))
                .collect();
            for name in names(&compile_assets(AssetKind::Javascript, &values(&items))) {
                prop_assert!(added.contains(name.as_str()));
            }
        }

        /// Property: a trailing `-*` drops everything
        #[test]
        fn trailing_clear_all_empties_output(mut items in asset_list()) {
            items.push("-*".to_string());
            prop_assert!(compile_assets(AssetKind::Stylesheet, &values(&items)).is_empty());
        }

        /// Property: without directives, output is the input in first-seen order
        #[test]
        fn plain_names_keep_first_seen_order(items in prop::collection::vec("[a-e]", 0..16)) {
            let mut expected: Vec<String> = Vec::new();
            for item in &items {
                if !expected.contains(item) {
                    expected.push(item.clone());
                }
            }
            prop_assert_eq!(names(&compile_assets(AssetKind::Stylesheet, &values(&items))), expected);
        }

        /// Property: removing a name after everything else drops only that name
        #[test]
        fn trailing_removal_drops_one_name(items in prop::collection::vec("[a-e]", 1..16)) {
            let target = items[0].clone();
            let before = names(&compile_assets(AssetKind::Stylesheet, &values(&items)));
            let mut with_removal = items.clone();
            with_removal.push(format!("-{}", target));
            let after = names(&compile_assets(AssetKind::Stylesheet, &values(&with_removal)));
            let expected: Vec<String> = before.into_iter().filter(|name| *name != target).collect();
            prop_assert_eq!(after, expected);
        }

        /// Property: merging onto an empty base returns the overlay
        #[test]
        fn deep_merge_onto_empty_is_identity(overlay in flat_mapping()) {
            prop_assert_eq!(deep_merge(&Mapping::new(), &overlay), overlay);
        }

        /// Property: merging a mapping with itself changes nothing
        #[test]
        fn deep_merge_is_idempotent(mapping in flat_mapping()) {
            prop_assert_eq!(deep_merge(&mapping, &mapping), mapping);
        }
    }
}
