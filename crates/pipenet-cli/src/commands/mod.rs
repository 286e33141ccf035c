//! Command implementations

mod associate;
mod cluster;
mod config;
mod length;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref(), cli.overrides())?;

    match cli.command {
        Commands::Length(args) => length::execute(args, &output),
        Commands::Associate(args) => associate::execute(args, &config, &output),
        Commands::Cluster(args) => cluster::execute(args, &config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}
