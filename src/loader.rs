//! # Configuration Loading
//!
//! The compiler never touches the filesystem. This module is the collaborator
//! that turns an ordered list of configuration files into a raw
//! [`ConfigTree`].
//!
//! Files are parsed with `serde_yaml` and deep-merged in the order given, so
//! a module's `view.yml` listed after the application's overrides it. An
//! empty file contributes nothing.
//!
//! ## Errors
//!
//! - A file that does not exist or cannot be read yields
//!   `Error::ConfigUnreadable`.
//! - A file that does not parse, or whose top level is not a mapping of view
//!   names, yields `Error::ConfigMalformed`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_yaml::{Mapping, Value};

use crate::config::ConfigTree;
use crate::error::{Error, Result};
use crate::merge::yaml::{deep_merge, type_name};

/// Produces a raw configuration tree from a list of file locations.
pub trait ConfigLoader {
    /// Load and combine `files`, in order.
    fn load(&self, files: &[PathBuf]) -> Result<ConfigTree>;
}

/// Loads `view.yml` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileLoader;

impl YamlFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse one YAML document into its top-level mapping.
    ///
    /// `source` names the document in error messages.
    pub fn parse_str(text: &str, source: &str) -> Result<Mapping> {
        let value: Value = serde_yaml::from_str(text).map_err(|err| Error::ConfigMalformed {
            path: source.to_string(),
            message: err.to_string(),
            hint: None,
        })?;

        match value {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(Error::ConfigMalformed {
                path: source.to_string(),
                message: format!(
                    "expected a mapping of view names, found {}",
                    type_name(&other)
                ),
                hint: Some("Top-level keys must be view names such as 'all'".to_string()),
            }),
        }
    }

    /// Read and parse one file.
    pub fn parse_file(path: &Path) -> Result<Mapping> {
        let source = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|err| Error::ConfigUnreadable {
            path: source.clone(),
            message: err.to_string(),
        })?;
        debug!("Read configuration file {}", source);
        Self::parse_str(&text, &source)
    }
}

impl ConfigLoader for YamlFileLoader {
    fn load(&self, files: &[PathBuf]) -> Result<ConfigTree> {
        let mut combined = Mapping::new();
        for path in files {
            let layer = Self::parse_file(path)?;
            combined = deep_merge(&combined, &layer);
        }
        let source = files
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        ConfigTree::from_value(Value::Mapping(combined), &source)
    }
}

/// Expand glob patterns into configuration paths.
///
/// Arguments without glob metacharacters are kept as they are, so a missing
/// file still surfaces as `Error::ConfigUnreadable` when loaded. Matches of a
/// pattern are sorted; a pattern matching nothing contributes nothing.
pub fn expand_config_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let mut matches = Vec::new();
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|err| Error::ConfigUnreadable {
                path: err.path().display().to_string(),
                message: err.error().to_string(),
            })?;
            matches.push(path);
        }
        if matches.is_empty() {
            warn!("Pattern '{}' matched no configuration files", pattern);
        }
        matches.sort();
        paths.extend(matches);
    }
    Ok(paths)
}
