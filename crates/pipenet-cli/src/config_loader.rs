//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use pipenet_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Defaults, then the config file if one was given, then the environment,
/// then command-line overrides
pub fn load_config(config_file: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}
