//! # Merged Command Implementation
//!
//! Prints the configuration tree after `default` has been folded into `all`
//! and constants substituted: exactly what the emitters resolve against.

use anyhow::{bail, Result};
use clap::Args;

use view_config::loader::{expand_config_paths, ConfigLoader, YamlFileLoader};
use view_config::merge::merge_layers;

use super::GenerateArgs;

/// Print the merged configuration tree as YAML
#[derive(Args, Debug)]
pub struct MergedArgs {
    /// Configuration files, merged in order (glob patterns are expanded)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

/// Execute the `merged` command.
pub fn execute(args: MergedArgs) -> Result<()> {
    let files = expand_config_paths(&args.files)?;
    if files.is_empty() {
        bail!("No configuration files matched {}", args.files.join(", "));
    }

    let constants = args.generate.load_constants()?;
    let raw = YamlFileLoader::new().load(&files)?;
    let merged = merge_layers(raw, &constants);
    print!("{}", merged.to_yaml_string()?);
    Ok(())
}
