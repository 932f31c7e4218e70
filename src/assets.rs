//! # Asset List Compilation
//!
//! `stylesheets` and `javascripts` are ordered lists whose entries are either
//! a bare name or a one-entry mapping of name to options:
//!
//! ```yaml
//! stylesheets:
//!   - main
//!   - print: { media: print, position: last }
//!   - -legacy     # drop an asset queued by an earlier layer
//!   - -*          # drop everything queued so far
//! ```
//!
//! [`compile_assets`] scans the list once, keeping an insertion-ordered map
//! from asset name to its pending statement:
//!
//! - `-*` clears the map.
//! - `-name` removes `name` if queued.
//! - any other name is queued; queuing a name that is already present
//!   replaces its statement but keeps its slot, while a name removed earlier
//!   is queued at the end.
//!
//! The `position` option becomes the statement's position and is stripped
//! from the emitted options.

use indexmap::IndexMap;
use log::{trace, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::codegen::ir::Statement;
use crate::config::{key_string, scalar_string};

const CLEAR_ALL: &str = "-*";
const POSITION_KEY: &str = "position";

/// Kind of asset a list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Stylesheet,
    Javascript,
}

impl AssetKind {
    /// Configuration key listing assets of this kind.
    pub fn config_key(self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "stylesheets",
            AssetKind::Javascript => "javascripts",
        }
    }
}

/// One parsed entry of an asset list.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub name: String,
    pub options: Mapping,
}

impl AssetEntry {
    /// Parse a list item: a scalar name or a one-entry `{name: options}`.
    ///
    /// Options that are not a mapping are ignored; extra entries in the
    /// outer mapping are ignored as well.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Mapping(map) => match map.iter().next() {
                Some((key, options)) => Self {
                    name: key_string(key),
                    options: options.as_mapping().cloned().unwrap_or_default(),
                },
                None => Self::named(""),
            },
            other => Self::named(scalar_string(other).unwrap_or_default()),
        }
    }

    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Mapping::new(),
        }
    }
}

/// Compile an ordered asset list into ordered `AddAsset` statements.
pub fn compile_assets(kind: AssetKind, assets: &[Value]) -> Vec<Statement> {
    let mut pending: IndexMap<String, Statement> = IndexMap::new();

    for asset in assets {
        let AssetEntry { name, mut options } = AssetEntry::from_value(asset);

        if name.is_empty() {
            warn!("Skipping {:?} entry without a name", kind);
            continue;
        }

        if name == CLEAR_ALL {
            trace!("{:?}: clearing {} queued asset(s)", kind, pending.len());
            pending.clear();
        } else if let Some(removed) = name.strip_prefix('-') {
            trace!("{:?}: removing '{}'", kind, removed);
            pending.shift_remove(removed);
        } else {
            let position = options
                .shift_remove(POSITION_KEY)
                .and_then(|value| scalar_string(&value))
                .unwrap_or_default();
            trace!("{:?}: queueing '{}'", kind, name);
            pending.insert(
                name.clone(),
                Statement::AddAsset {
                    kind,
                    name,
                    position,
                    options,
                },
            );
        }
    }

    pending.into_values().collect()
}

/// Items of a merged asset value.
///
/// A mapping (`stylesheets: {main: {media: screen}}`) is read as a list of
/// one-entry mappings in key order.
pub fn asset_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Sequence(items) => items.clone(),
        Value::Mapping(map) => map
            .iter()
            .map(|(key, options)| {
                let mut entry = Mapping::new();
                entry.insert(key.clone(), options.clone());
                Value::Mapping(entry)
            })
            .collect(),
        _ => Vec::new(),
    }
}
