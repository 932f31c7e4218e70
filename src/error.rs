//! # Error Handling
//!
//! This module defines the centralized error type for `view-config`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure the compiler and its collaborators can report.
//!
//! ## Taxonomy
//!
//! - **`ConfigUnreadable`**: a listed configuration file does not exist or
//!   cannot be read.
//! - **`ConfigMalformed`**: a configuration file does not parse, or parses
//!   into something other than a mapping of view names.
//! - **`KeyCheckFailed`**: a required or forbidden key pattern was violated.
//!   The compiler itself never raises it; it is the variant schema
//!   collaborators report through.
//! - **`ConstantsFile`**: a constants table could not be loaded.
//!
//! Everything the compiler meets after loading (absent optional keys,
//! malformed component entries, empty asset lists) degrades to a default
//! instead of producing an error.

use thiserror::Error;

/// Main error type for view-config operations
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration file is missing or unreadable.
    #[error("Configuration file {path} is unreadable: {message}")]
    ConfigUnreadable { path: String, message: String },

    /// A configuration file is improperly formatted.
    ///
    /// Carries an optional hint about how to fix the file.
    #[error("Configuration file {path} is malformed: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigMalformed {
        path: String,
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A key check failed on a view configuration.
    #[error("Key check failed for '{key}': {message}")]
    KeyCheckFailed { key: String, message: String },

    /// A constants table could not be loaded.
    #[error("Constants file {path} could not be loaded: {message}")]
    ConstantsFile { path: String, message: String },

    /// A YAML serialization error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
