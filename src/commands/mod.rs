//! # CLI Command Implementations
//!
//! One module per `view-config` subcommand. Each defines an `Args` struct
//! derived with `clap` and an `execute` function that calls into the
//! `view_config` library.

pub mod build;
pub mod compile;
pub mod completions;
pub mod merged;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Args;

use view_config::codegen::CompileOptions;
use view_config::constants::ConstantMap;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Options shared by every command that merges configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// YAML, JSON or TOML table of constants for %NAME% placeholders
    #[arg(long, value_name = "FILE", env = "VIEW_CONFIG_CONSTANTS")]
    pub constants: Option<PathBuf>,

    /// Fixed generation timestamp ("YYYY-MM-DD HH:MM:SS") instead of now
    #[arg(long, value_name = "DATETIME", value_parser = parse_timestamp)]
    pub date: Option<NaiveDateTime>,
}

impl GenerateArgs {
    /// Load the constants table, or an empty one.
    pub fn load_constants(&self) -> Result<ConstantMap> {
        match &self.constants {
            Some(path) => ConstantMap::from_file(path)
                .with_context(|| format!("Failed to load constants from {}", path.display())),
            None => Ok(ConstantMap::new()),
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            generated_at: self.date,
        }
    }
}

fn parse_timestamp(text: &str) -> std::result::Result<NaiveDateTime, String> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM:SS, got '{}'", text))
}
