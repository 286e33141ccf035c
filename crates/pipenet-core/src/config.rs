use crate::error::{PipenetError, Result};
use crate::models::{Tolerance, ToleranceUnit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for pipenet
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// How close an application must be to a pipe to belong to it
    pub association_tolerance: ConfigValue<f64>,
    pub tolerance_unit: ConfigValue<ToleranceUnit>,
    /// Grid cell size in degrees for marker clustering
    pub cluster_tolerance: ConfigValue<f64>,
    /// Keep completed applications in map computations
    pub include_completed: ConfigValue<bool>,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            association_tolerance: ConfigValue::new(0.001, ConfigSource::Default),
            tolerance_unit: ConfigValue::new(ToleranceUnit::Degrees, ConfigSource::Default),
            cluster_tolerance: ConfigValue::new(0.0001, ConfigSource::Default),
            include_completed: ConfigValue::new(false, ConfigSource::Default),
        }
    }

    /// The association tolerance with its unit
    pub fn association_tolerance(&self) -> Tolerance {
        Tolerance::new(self.association_tolerance.value, self.tolerance_unit.value)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| PipenetError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| PipenetError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(tolerance) = file_config.association_tolerance {
            self.association_tolerance
                .update(validate_tolerance("association_tolerance", tolerance)?, ConfigSource::File);
        }

        if let Some(unit) = file_config.tolerance_unit {
            self.tolerance_unit.update(unit, ConfigSource::File);
        }

        if let Some(tolerance) = file_config.cluster_tolerance {
            self.cluster_tolerance
                .update(validate_cell_size("cluster_tolerance", tolerance)?, ConfigSource::File);
        }

        if let Some(include) = file_config.include_completed {
            self.include_completed.update(include, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // PIPENET_ASSOCIATION_TOLERANCE
        if let Ok(raw) = env::var("PIPENET_ASSOCIATION_TOLERANCE") {
            match parse_tolerance("association_tolerance", &raw) {
                Ok(value) => self.association_tolerance.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PIPENET_ASSOCIATION_TOLERANCE value '{}': expected a non-negative number",
                    raw
                ),
            }
        }

        // PIPENET_TOLERANCE_UNIT
        if let Ok(raw) = env::var("PIPENET_TOLERANCE_UNIT") {
            match parse_tolerance_unit(&raw) {
                Ok(unit) => self.tolerance_unit.update(unit, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PIPENET_TOLERANCE_UNIT value '{}': expected degrees or meters",
                    raw
                ),
            }
        }

        // PIPENET_CLUSTER_TOLERANCE
        if let Ok(raw) = env::var("PIPENET_CLUSTER_TOLERANCE") {
            match parse_cell_size("cluster_tolerance", &raw) {
                Ok(value) => self.cluster_tolerance.update(value, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PIPENET_CLUSTER_TOLERANCE value '{}': expected a positive number",
                    raw
                ),
            }
        }

        // PIPENET_INCLUDE_COMPLETED
        if let Ok(raw) = env::var("PIPENET_INCLUDE_COMPLETED") {
            match parse_bool(&raw) {
                Some(include) => self.include_completed.update(include, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid PIPENET_INCLUDE_COMPLETED value '{}': expected true or false",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(tolerance) = overrides.association_tolerance {
            self.association_tolerance.update(tolerance, ConfigSource::Cli);
        }

        if let Some(unit) = overrides.tolerance_unit {
            self.tolerance_unit.update(unit, ConfigSource::Cli);
        }

        if let Some(tolerance) = overrides.cluster_tolerance {
            self.cluster_tolerance.update(tolerance, ConfigSource::Cli);
        }

        if let Some(include) = overrides.include_completed {
            self.include_completed.update(include, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "association_tolerance".to_string(),
            (self.association_tolerance.value.to_string(), self.association_tolerance.source),
        );

        map.insert(
            "tolerance_unit".to_string(),
            (self.tolerance_unit.value.to_string(), self.tolerance_unit.source),
        );

        map.insert(
            "cluster_tolerance".to_string(),
            (self.cluster_tolerance.value.to_string(), self.cluster_tolerance.source),
        );

        map.insert(
            "include_completed".to_string(),
            (self.include_completed.value.to_string(), self.include_completed.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    association_tolerance: Option<f64>,
    tolerance_unit: Option<ToleranceUnit>,
    cluster_tolerance: Option<f64>,
    include_completed: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub association_tolerance: Option<f64>,
    pub tolerance_unit: Option<ToleranceUnit>,
    pub cluster_tolerance: Option<f64>,
    pub include_completed: Option<bool>,
}

fn validate_tolerance(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PipenetError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("{} must be a non-negative number", value),
        })
    }
}

/// Smallest grid cell whose index for any longitude still fits an `i64`
pub const MIN_CELL_SIZE: f64 = 1e-15;

fn validate_cell_size(key: &str, value: f64) -> Result<f64> {
    if !(value.is_finite() && value > 0.0) {
        return Err(PipenetError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("{} must be a positive number", value),
        });
    }
    if value < MIN_CELL_SIZE {
        return Err(PipenetError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("{} is below the smallest cell size {}", value, MIN_CELL_SIZE),
        });
    }
    Ok(value)
}

/// Parse a non-negative tolerance from string
pub fn parse_tolerance(key: &str, s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|_| PipenetError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("Invalid number: {}", s),
    })?;
    validate_tolerance(key, value)
}

/// Parse a positive grid cell size from string
pub fn parse_cell_size(key: &str, s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|_| PipenetError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("Invalid number: {}", s),
    })?;
    validate_cell_size(key, value)
}

/// Parse tolerance unit from string
pub fn parse_tolerance_unit(s: &str) -> Result<ToleranceUnit> {
    match s.trim().to_lowercase().as_str() {
        "degrees" | "degree" | "deg" => Ok(ToleranceUnit::Degrees),
        "meters" | "metres" | "m" => Ok(ToleranceUnit::Meters),
        _ => Err(PipenetError::ConfigInvalid {
            key: "tolerance_unit".to_string(),
            reason: format!("Invalid tolerance unit: {}. Use degrees or meters", s),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
