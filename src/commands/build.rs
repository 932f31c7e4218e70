//! # Build Command Implementation
//!
//! Compiles every module of an application in one go. A module is a
//! directory under `--modules-dir` containing `config/view.yml`:
//!
//! ```text
//! modules/
//!   blog/config/view.yml      -> out/blog.js
//!   shop/config/view.yml      -> out/shop.js
//! ```
//!
//! Each module is compiled from `[--app-config, module view.yml]`, so the
//! module's file overrides the application's. Modules are independent and
//! compiled in parallel; all of them share one generation timestamp.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use log::debug;
use rayon::prelude::*;
use walkdir::WalkDir;

use view_config::codegen::{compile_files, CompileOptions};
use view_config::constants::ConstantResolver;
use view_config::loader::YamlFileLoader;
use view_config::output::{status_line, OutputConfig, Status};

use super::GenerateArgs;

const CONFIG_DIR: &str = "config";
const VIEW_FILE: &str = "view.yml";

/// Compile every module's config/view.yml into an output directory
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Application-wide view.yml merged under every module's own file
    #[arg(long, value_name = "FILE")]
    pub app_config: Option<PathBuf>,

    /// Directory holding one subdirectory per module
    #[arg(long, value_name = "DIR", default_value = "modules")]
    pub modules_dir: PathBuf,

    /// Directory the generated <module>.js files are written to
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// A module with a view configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    pub name: String,
    pub view_file: PathBuf,
}

/// Find `<dir>/<module>/config/view.yml` files, sorted by module name.
pub fn discover_modules(modules_dir: &Path) -> Result<Vec<ModuleConfig>> {
    let mut modules = Vec::new();
    for entry in WalkDir::new(modules_dir)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to scan {}", modules_dir.display()))?;
        if !entry.file_type().is_file() || entry.file_name() != VIEW_FILE {
            continue;
        }

        let path = entry.path();
        let config_dir = path.parent();
        if config_dir.and_then(Path::file_name) != Some(OsStr::new(CONFIG_DIR)) {
            continue;
        }
        let Some(name) = config_dir
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
        else {
            continue;
        };

        debug!("Found module '{}' at {}", name, path.display());
        modules.push(ModuleConfig {
            name: name.to_string(),
            view_file: path.to_path_buf(),
        });
    }
    Ok(modules)
}

fn build_module(
    module: &ModuleConfig,
    app_config: Option<&Path>,
    out_dir: &Path,
    constants: &dyn ConstantResolver,
    options: &CompileOptions,
) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = app_config.map(Path::to_path_buf).into_iter().collect();
    files.push(module.view_file.clone());

    let compiled = compile_files(&files, &YamlFileLoader::new(), constants, options)?;
    let out_file = out_dir.join(format!("{}.js", module.name));
    fs::write(&out_file, compiled.render())
        .with_context(|| format!("Failed to write {}", out_file.display()))?;
    Ok(out_file)
}

/// Execute the `build` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: BuildArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if !args.modules_dir.is_dir() {
        bail!("Modules directory {} does not exist", args.modules_dir.display());
    }
    let modules = discover_modules(&args.modules_dir)?;
    println!(
        "{}",
        status_line(
            &out,
            Status::Scan,
            &format!(
                "Found {} module(s) in {}",
                modules.len(),
                args.modules_dir.display()
            )
        )
    );
    if modules.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let constants = args.generate.load_constants()?;
    let options = CompileOptions::at(
        args.generate
            .date
            .unwrap_or_else(|| Local::now().naive_local()),
    );

    let results: Vec<(&ModuleConfig, Result<PathBuf>)> = modules
        .par_iter()
        .map(|module| {
            let result = build_module(
                module,
                args.app_config.as_deref(),
                &args.out_dir,
                &constants,
                &options,
            );
            (module, result)
        })
        .collect();

    let mut failed = 0;
    for (module, result) in &results {
        match result {
            Ok(path) => println!(
                "{}",
                status_line(&out, Status::Wrote, &path.display().to_string())
            ),
            Err(err) => {
                failed += 1;
                eprintln!(
                    "{}",
                    status_line(&out, Status::Failed, &format!("{}: {:#}", module.name, err))
                );
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} module(s) failed to compile", failed, results.len());
    }
    println!(
        "{}",
        status_line(
            &out,
            Status::Done,
            &format!("{} module(s) compiled", results.len())
        )
    );
    Ok(())
}
