//! # Constant Substitution
//!
//! Configuration strings may contain `%NAME%` placeholders that are replaced
//! with application constants once layers are merged:
//!
//! ```yaml
//! all:
//!   stylesheets: ["%SF_WEB_DIR%/css/main.css"]
//! ```
//!
//! Lookups go through the [`ConstantResolver`] trait with the lower-cased
//! placeholder name. Unknown placeholders are left untouched, so a missing
//! constant is visible in the generated output instead of silently vanishing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};

use crate::config::{key_string, scalar_string};
use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(.+?)%").expect("placeholder pattern is valid"));

/// Source of constant values for `%NAME%` placeholders.
pub trait ConstantResolver {
    /// Value of the constant `name` (already lower-cased), if defined.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolver that defines no constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstants;

impl ConstantResolver for NoConstants {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// In-memory constants table. Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantMap {
    values: HashMap<String, String>,
}

impl ConstantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a constant. The name is lower-cased.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load a constants table from a YAML, JSON or TOML file, chosen by
    /// extension (anything unrecognized is read as YAML).
    ///
    /// Nested tables are flattened by joining keys with `_`, so
    /// `sf: {charset: utf-8}` defines `sf_charset`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConstantsFile` when the file cannot be read or parsed,
    /// or when its top level is not a table.
    pub fn from_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|err| Error::ConstantsFile {
            path: display.clone(),
            message: err.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let value: Value = match extension.as_str() {
            "json" => serde_json::from_str::<serde_json::Value>(&text)
                .map_err(|err| err.to_string())
                .and_then(|json| serde_yaml::to_value(json).map_err(|err| err.to_string())),
            "toml" => toml::from_str::<toml::Table>(&text)
                .map_err(|err| err.to_string())
                .and_then(|table| serde_yaml::to_value(table).map_err(|err| err.to_string())),
            _ => serde_yaml::from_str::<Value>(&text).map_err(|err| err.to_string()),
        }
        .map_err(|message| Error::ConstantsFile {
            path: display.clone(),
            message,
        })?;

        Self::from_value(&value).ok_or_else(|| Error::ConstantsFile {
            path: display,
            message: "expected a table of constant names".to_string(),
        })
    }

    /// Build a table from a mapping value; `None` if it is not a mapping.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mapping = value.as_mapping()?;
        let mut constants = Self::new();
        for (key, value) in mapping {
            constants.flatten(&key_string(key), value);
        }
        Some(constants)
    }

    fn flatten(&mut self, name: &str, value: &Value) {
        match value {
            Value::Mapping(nested) => {
                for (key, value) in nested {
                    self.flatten(&format!("{}_{}", name, key_string(key)), value);
                }
            }
            other => match scalar_string(other) {
                Some(text) => self.insert(name, text),
                None if other.is_null() => self.insert(name, ""),
                None => warn!("Constant '{}' is not a scalar; skipping it", name),
            },
        }
    }
}

impl ConstantResolver for ConstantMap {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ConstantMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut constants = Self::new();
        for (name, value) in iter {
            constants.insert(name.as_ref(), value);
        }
        constants
    }
}

/// Replace every known `%NAME%` placeholder in `text`.
pub fn replace_in_str(text: &str, resolver: &dyn ConstantResolver) -> String {
    if !text.contains('%') {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            resolver
                .resolve(&caps[1].to_lowercase())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace placeholders in every string inside `value`. Keys are left alone.
pub fn replace_constants(value: Value, resolver: &dyn ConstantResolver) -> Value {
    match value {
        Value::String(text) => Value::String(replace_in_str(&text, resolver)),
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(|item| replace_constants(item, resolver))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(replace_in_mapping(map, resolver)),
        Value::Tagged(mut tagged) => {
            tagged.value = replace_constants(tagged.value, resolver);
            Value::Tagged(tagged)
        }
        scalar => scalar,
    }
}

/// Replace placeholders in every value of `mapping`. Keys are left alone.
pub fn replace_in_mapping(mapping: Mapping, resolver: &dyn ConstantResolver) -> Mapping {
    mapping
        .into_iter()
        .map(|(key, item)| (key, replace_constants(item, resolver)))
        .collect()
}
