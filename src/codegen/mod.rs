//! # Code Generation
//!
//! Turns a raw configuration tree into a generated view initializer.
//!
//! ## Pipeline
//!
//! 1. [`merge_layers`] folds `default` into `all` and substitutes constants.
//! 2. [`dispatch::build_procedure`] runs the emitters for every view and
//!    arranges them into the two dispatch phases.
//! 3. [`render::render`] writes the procedure out as a script body.
//!
//! [`compile_files`] adds a [`ConfigLoader`] in front of step 1; loader
//! errors are returned as they are.

pub mod dispatch;
pub mod ir;
pub mod render;

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::config::ConfigTree;
use crate::constants::ConstantResolver;
use crate::error::Result;
use crate::loader::ConfigLoader;
use crate::merge::merge_layers;
use ir::Procedure;

/// Knobs for a single compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Timestamp written to the header; the local time when `None`.
    pub generated_at: Option<NaiveDateTime>,
}

impl CompileOptions {
    /// Options with a fixed generation timestamp.
    pub fn at(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at: Some(generated_at),
        }
    }
}

/// Result of compiling one configuration-file set.
#[derive(Debug, Clone)]
pub struct CompiledView {
    /// The merged tree the procedure was generated from.
    pub merged: ConfigTree,
    pub procedure: Procedure,
}

impl CompiledView {
    /// The generated script body.
    pub fn render(&self) -> String {
        render::render(&self.procedure)
    }

    /// The procedure as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.procedure)?)
    }
}

/// Merge, resolve and generate from an already loaded tree.
pub fn compile_tree(
    raw: ConfigTree,
    constants: &dyn ConstantResolver,
    options: &CompileOptions,
) -> CompiledView {
    let merged = merge_layers(raw, constants);
    let generated_at = options
        .generated_at
        .unwrap_or_else(|| Local::now().naive_local());
    debug!(
        "Generating initializer for {} view(s)",
        merged.view_names().count()
    );
    let procedure = dispatch::build_procedure(&merged, generated_at);
    CompiledView { merged, procedure }
}

/// Load `files` in order and compile them.
pub fn compile_files(
    files: &[PathBuf],
    loader: &dyn ConfigLoader,
    constants: &dyn ConstantResolver,
    options: &CompileOptions,
) -> Result<CompiledView> {
    let raw = loader.load(files)?;
    Ok(compile_tree(raw, constants, options))
}
