//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use pipenet_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use pipenet_core::models::{Tolerance, ToleranceUnit};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: [&str; 4] = [
    "PIPENET_ASSOCIATION_TOLERANCE",
    "PIPENET_TOLERANCE_UNIT",
    "PIPENET_CLUSTER_TOLERANCE",
    "PIPENET_INCLUDE_COMPLETED",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_partial_file_configuration() {
    let file = config_file(
        r#"
cluster_tolerance = 0.0002
# Only override the cluster grid, leave the rest as defaults
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.cluster_tolerance.value, 0.0002);
    assert_eq!(config.cluster_tolerance.source, ConfigSource::File);
    assert_eq!(config.association_tolerance.source, ConfigSource::Default);
    assert_eq!(config.tolerance_unit.value, ToleranceUnit::Degrees);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file(
        r#"
association_tolerance = 0.002
tolerance_unit = "degrees"
"#,
    );

    env::set_var("PIPENET_ASSOCIATION_TOLERANCE", "30");
    env::set_var("PIPENET_TOLERANCE_UNIT", "meters");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.association_tolerance(), Tolerance::meters(30.0));
    assert_eq!(config.association_tolerance.source, ConfigSource::Environment);
    assert_eq!(config.tolerance_unit.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("PIPENET_CLUSTER_TOLERANCE", "zero");
    env::set_var("PIPENET_TOLERANCE_UNIT", "leagues");
    env::set_var("PIPENET_INCLUDE_COMPLETED", "perhaps");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.cluster_tolerance.value, 0.0001);
    assert_eq!(config.cluster_tolerance.source, ConfigSource::Default);
    assert_eq!(config.tolerance_unit.source, ConfigSource::Default);
    assert_eq!(config.include_completed.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    let file = config_file("include_completed = false");
    env::set_var("PIPENET_INCLUDE_COMPLETED", "false");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        include_completed: Some(true),
        ..Default::default()
    });

    assert!(config.include_completed.value);
    assert_eq!(config.include_completed.source, ConfigSource::Cli);

    clear_env();
}

#[test]
#[serial]
fn test_full_precedence_chain() {
    clear_env();
    let file = config_file(
        r#"
association_tolerance = 0.003
cluster_tolerance = 0.0003
"#,
    );
    env::set_var("PIPENET_CLUSTER_TOLERANCE", "0.0004");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        tolerance_unit: Some(ToleranceUnit::Meters),
        ..Default::default()
    });

    let map = config.to_inspection_map();
    assert_eq!(map["association_tolerance"], ("0.003".to_string(), ConfigSource::File));
    assert_eq!(map["cluster_tolerance"], ("0.0004".to_string(), ConfigSource::Environment));
    assert_eq!(map["tolerance_unit"], ("meters".to_string(), ConfigSource::Cli));
    assert_eq!(map["include_completed"], ("false".to_string(), ConfigSource::Default));

    clear_env();
}
