use clap::{Parser, Subcommand};
use pipenet_core::config::{parse_cell_size, parse_tolerance, CliConfigOverrides};
use pipenet_core::models::ToleranceUnit;
use std::path::PathBuf;

/// pipenet - water and sewer network geometry
#[derive(Parser, Debug)]
#[command(name = "pipenet")]
#[command(about = "Pipe lengths, application-to-pipe association and marker clustering", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Distance within which an application counts as on a pipe
    #[arg(long, global = true, value_parser = tolerance_arg)]
    pub tolerance: Option<f64>,

    /// Unit of --tolerance
    #[arg(long, global = true)]
    pub tolerance_unit: Option<UnitArg>,

    /// Grid cell size in degrees for marker clustering
    #[arg(long, global = true, value_parser = cell_size_arg)]
    pub cluster_tolerance: Option<f64>,

    /// Include completed applications
    #[arg(long, global = true)]
    pub include_completed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given on the command line
    pub fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            association_tolerance: self.tolerance,
            tolerance_unit: self.tolerance_unit.map(ToleranceUnit::from),
            cluster_tolerance: self.cluster_tolerance,
            include_completed: self.include_completed.then_some(true),
        }
    }
}

/// Tolerance unit selection
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum UnitArg {
    /// Raw latitude/longitude delta
    Degrees,
    /// Ground distance
    Meters,
}

impl From<UnitArg> for ToleranceUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Degrees => ToleranceUnit::Degrees,
            UnitArg::Meters => ToleranceUnit::Meters,
        }
    }
}

fn tolerance_arg(s: &str) -> Result<f64, String> {
    parse_tolerance("tolerance", s).map_err(|e| e.to_string())
}

fn cell_size_arg(s: &str) -> Result<f64, String> {
    parse_cell_size("cluster_tolerance", s).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Computed, manual and displayed length of every pipe
    Length(LengthArgs),

    /// Tie applications to pipes and list pipes with open work
    Associate(AssociateArgs),

    /// Group applications into map markers
    Cluster(ClusterArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct LengthArgs {
    /// Layer objects export (JSON)
    pub network: PathBuf,
}

#[derive(Parser, Debug)]
pub struct AssociateArgs {
    /// Applications export (JSON)
    pub applications: PathBuf,

    /// Layer objects export (JSON)
    pub network: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ClusterArgs {
    /// Applications export (JSON)
    pub applications: PathBuf,

    /// Only print groups with at least this many members
    #[arg(long, default_value = "1")]
    pub min_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "pipenet",
            "cluster",
            "apps.json",
            "--json",
            "--cluster-tolerance",
            "0.001",
            "--tolerance-unit",
            "meters",
        ]);
        assert!(cli.json);
        let overrides = cli.overrides();
        assert_eq!(overrides.cluster_tolerance, Some(0.001));
        assert_eq!(overrides.tolerance_unit, Some(ToleranceUnit::Meters));
        assert_eq!(overrides.association_tolerance, None);
        assert_eq!(overrides.include_completed, None);
    }

    #[test]
    fn test_rejects_bad_tolerances() {
        assert!(Cli::try_parse_from(["pipenet", "--tolerance", "-1", "config"]).is_err());
        assert!(Cli::try_parse_from(["pipenet", "--cluster-tolerance", "0", "config"]).is_err());
        assert!(Cli::try_parse_from(["pipenet", "--cluster-tolerance", "1e-18", "config"]).is_err());
        assert!(Cli::try_parse_from(["pipenet", "--tolerance", "abc", "config"]).is_err());
    }
}
