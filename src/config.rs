//! # View Configuration Data Model
//!
//! This module defines the in-memory shape of a `view.yml` configuration: a
//! [`ConfigTree`] mapping view identifiers to [`ViewConfig`] records.
//!
//! ## Layout of a configuration
//!
//! ```yaml
//! default:
//!   stylesheets: [main]
//!   has_layout: true
//!   layout: layout
//! all:
//!   metas:
//!     title: My site
//! editSuccess:
//!   template: form
//!   components:
//!     sidebar: [default, sidebar]
//! ```
//!
//! Two view identifiers are reserved: `default` is the base layer and `all`
//! is the overlay every view falls back to. After layer merging only `all`
//! remains. Every other key names a view, and the order those keys appear in
//! decides the order of the generated dispatch branches.
//!
//! Values are kept as `serde_yaml::Value`, whose mappings preserve insertion
//! order.

use indexmap::IndexMap;
use log::warn;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::merge::yaml::type_name;

/// The base layer folded into `all` during merging.
pub const DEFAULT_LAYER: &str = "default";

/// The overlay layer every view falls back to.
pub const ALL_LAYER: &str = "all";

/// Configuration of one view: configuration key to value.
pub type ViewConfig = Mapping;

/// Returns true for the reserved `default` and `all` identifiers.
pub fn is_reserved(view: &str) -> bool {
    view == DEFAULT_LAYER || view == ALL_LAYER
}

/// Ordered mapping from view identifier to its configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    views: IndexMap<String, ViewConfig>,
}

impl ConfigTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a parsed YAML document.
    ///
    /// The document must be a mapping (or null, which yields an empty tree).
    /// A view whose value is null becomes an empty view; a view whose value
    /// is any other non-mapping is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigMalformed` naming `source` when the document is
    /// not a mapping.
    pub fn from_value(value: Value, source: &str) -> Result<Self> {
        let mapping = match value {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            Value::Tagged(tagged) => return Self::from_value(tagged.value, source),
            other => {
                return Err(Error::ConfigMalformed {
                    path: source.to_string(),
                    message: format!(
                        "expected a mapping of view names, found {}",
                        type_name(&other)
                    ),
                    hint: Some("Top-level keys must be view names such as 'all'".to_string()),
                })
            }
        };

        let mut tree = Self::new();
        for (key, value) in mapping {
            let view = key_string(&key);
            let config = match value {
                Value::Mapping(config) => config,
                Value::Null => Mapping::new(),
                other => {
                    warn!(
                        "{}: view '{}' is a {}, not a mapping; treating it as empty",
                        source,
                        view,
                        type_name(&other)
                    );
                    Mapping::new()
                }
            };
            tree.insert(view, config);
        }
        Ok(tree)
    }

    /// Parse a YAML string into a tree.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigMalformed` naming `source` when the text is not
    /// valid YAML or not a mapping.
    pub fn from_yaml_str(text: &str, source: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text).map_err(|err| Error::ConfigMalformed {
            path: source.to_string(),
            message: err.to_string(),
            hint: None,
        })?;
        Self::from_value(value, source)
    }

    /// Convert the tree back into a YAML mapping.
    pub fn to_value(&self) -> Value {
        let mut mapping = Mapping::new();
        for (view, config) in &self.views {
            mapping.insert(Value::String(view.clone()), Value::Mapping(config.clone()));
        }
        Value::Mapping(mapping)
    }

    /// The tree as a YAML document.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value())?)
    }

    /// Configuration of `view`, if present.
    pub fn get(&self, view: &str) -> Option<&ViewConfig> {
        self.views.get(view)
    }

    /// Mutable configuration of `view`, if present.
    pub fn get_mut(&mut self, view: &str) -> Option<&mut ViewConfig> {
        self.views.get_mut(view)
    }

    /// Mutable configuration of `view`, inserting an empty one at the end if
    /// absent.
    pub fn entry(&mut self, view: &str) -> &mut ViewConfig {
        self.views.entry(view.to_string()).or_default()
    }

    /// Insert or replace a view. Replacing keeps the view's position.
    pub fn insert(&mut self, view: impl Into<String>, config: ViewConfig) -> Option<ViewConfig> {
        self.views.insert(view.into(), config)
    }

    /// Remove a view, keeping the order of the remaining ones.
    pub fn remove(&mut self, view: &str) -> Option<ViewConfig> {
        self.views.shift_remove(view)
    }

    /// Whether `view` is present.
    pub fn contains(&self, view: &str) -> bool {
        self.views.contains_key(view)
    }

    /// The `all` layer, if present.
    pub fn all(&self) -> Option<&ViewConfig> {
        self.get(ALL_LAYER)
    }

    /// All views in order, reserved ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ViewConfig)> {
        self.views.iter().map(|(view, config)| (view.as_str(), config))
    }

    /// Non-reserved view identifiers in order.
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views
            .keys()
            .map(String::as_str)
            .filter(|view| !is_reserved(view))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Apply `f` to every view configuration, producing a new tree.
    pub fn map_configs(self, mut f: impl FnMut(ViewConfig) -> ViewConfig) -> Self {
        Self {
            views: self
                .views
                .into_iter()
                .map(|(view, config)| (view, f(config)))
                .collect(),
        }
    }
}

/// Render a mapping key as a string.
///
/// YAML allows non-string keys (`404: ...`, `true: ...`); they are named by
/// their scalar text.
pub fn key_string(key: &Value) -> String {
    scalar_string(key).unwrap_or_else(|| format!("{:?}", key))
}

/// Spellings YAML 1.1 reads as boolean false.
const FALSE_WORDS: [&str; 4] = ["false", "off", "no", "n"];

/// Text of a scalar value; `None` for null, sequences and mappings.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Truthiness of a configuration value.
///
/// `false`, null, zero, the empty string, `"0"`, empty collections and the
/// YAML 1.1 false words (`false`, `off`, `no`, `n`, any case) are falsy;
/// everything else is truthy. `serde_yaml` reads `has_layout: off` as the
/// string `"off"`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || is_false_word(s)),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn is_false_word(text: &str) -> bool {
    FALSE_WORDS
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word))
}
