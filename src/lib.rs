//! # View Configuration Compiler
//!
//! `view-config` compiles layered `view.yml` files into the initializer a
//! rendering pipeline runs once per request to set up a view: template,
//! decorator layout, component slots, head metadata, escaping method and
//! stylesheet/script assets.
//!
//! ## Quick Example
//!
//! ```
//! use chrono::NaiveDate;
//! use view_config::codegen::{compile_tree, CompileOptions};
//! use view_config::config::ConfigTree;
//! use view_config::constants::NoConstants;
//!
//! let raw = ConfigTree::from_yaml_str(
//!     "default:\n  stylesheets: [main]\nall:\n  template: home\n",
//!     "view.yml",
//! )
//! .unwrap();
//!
//! let generated_at = NaiveDate::from_ymd_opt(2024, 1, 2)
//!     .unwrap()
//!     .and_hms_opt(3, 4, 5)
//!     .unwrap();
//! let compiled = compile_tree(raw, &NoConstants, &CompileOptions::at(generated_at));
//!
//! let script = compiled.render();
//! assert!(script.contains("// date: 2024/01/02 03:04:05"));
//! assert!(script.contains("response.addStylesheet('main', '', {});"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the [`config::ConfigTree`], an ordered
//!   mapping from view identifier to that view's settings. `default` and
//!   `all` are reserved layer names.
//! - **Merging (`merge`)**: folds `default` into `all`, concatenating asset
//!   lists first, then substitutes `%CONSTANT%` placeholders.
//! - **Resolution (`resolve`)**: looks a key up for one view, falling back to
//!   `all`, or combines additive keys across both.
//! - **Assets (`assets`)**: turns an asset list with `-name` / `-*`
//!   directives into an ordered, deduplicated list.
//! - **Emitters (`emit`)**: one per facet, producing IR statements.
//! - **Code generation (`codegen`)**: two-phase view dispatch over the
//!   emitters, rendered as a script body.
//!
//! Reading files (`loader`) and constant tables (`constants`) are
//! collaborators behind traits; nothing in the core performs I/O.

pub mod assets;
pub mod codegen;
pub mod config;
pub mod constants;
pub mod emit;
pub mod error;
pub mod loader;
pub mod merge;
pub mod output;
pub mod resolve;

#[cfg(test)]
mod assets_proptest;
