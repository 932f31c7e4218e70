//! # Compile Command Implementation
//!
//! Loads one configuration-file set, compiles it and writes the generated
//! initializer (or its JSON form) to stdout or a file.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use log::info;

use view_config::codegen::compile_files;
use view_config::loader::{expand_config_paths, YamlFileLoader};

use super::GenerateArgs;

/// What `compile` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The generated script body
    Script,
    /// The generated procedure as JSON
    Json,
}

/// Compile configuration files into one view initializer
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Configuration files, merged in order (glob patterns are expanded)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Script)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Execute the `compile` command.
pub fn execute(args: CompileArgs) -> Result<()> {
    let files = expand_config_paths(&args.files)?;
    if files.is_empty() {
        bail!("No configuration files matched {}", args.files.join(", "));
    }

    let constants = args.generate.load_constants()?;
    let compiled = compile_files(
        &files,
        &YamlFileLoader::new(),
        &constants,
        &args.generate.compile_options(),
    )?;

    let mut text = match args.format {
        OutputFormat::Script => compiled.render(),
        OutputFormat::Json => compiled.to_json()?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match &args.output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
