//! # view-config CLI
//!
//! Binary entry point for the `view-config` command-line tool. It parses
//! arguments with `clap` and hands off to the command implementations; all
//! compilation logic lives in the `view_config` library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
