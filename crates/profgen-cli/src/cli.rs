use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "profgen", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the profile or inflow dataset of one technology
    Build(BuildArgs),
    /// Summarise a dataset directory and verify its checksums
    Inspect {
        /// Dataset directory written by `profgen build`
        #[arg(value_hint = ValueHint::DirPath)]
        dataset: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = InspectFormat::Plain)]
        format: InspectFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Run configuration (YAML or JSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: PathBuf,
    /// Technology key under `renewable`, e.g. onwind, offwind-ac, solar, hydro
    #[arg(long)]
    pub technology: String,
    /// Bus regions (GeoJSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub regions: PathBuf,
    /// Output dataset directory
    #[arg(long, short, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,
    /// Cutout directory, overriding the configured one
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub cutout: Option<PathBuf>,
    /// Land cover raster (ESRI ASCII grid)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub copernicus: Option<PathBuf>,
    /// Bathymetry raster (ESRI ASCII grid)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub gebco: Option<PathBuf>,
    /// Protected areas raster (ESRI ASCII grid)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub natura: Option<PathBuf>,
    /// Country shapes for shore distance limits (GeoJSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub country_shapes: Option<PathBuf>,
    /// Offshore shapes for the underwater fraction (GeoJSON)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub offshore_shapes: Option<PathBuf>,
    /// Power plant table with `bus` and `carrier` columns (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub powerplants: Option<PathBuf>,
    /// Per-country average hydro inflow (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub hydro_capacities: Option<PathBuf>,
    /// EIA hydroelectricity generation export (CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub eia_hydro_generation: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum InspectFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
