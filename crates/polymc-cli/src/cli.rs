use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "polymc - Metropolis Monte Carlo sampling of coarse-grained polymer chains, rings and meshes.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Monte Carlo simulation described by a parameter file.
    Run(RunArgs),
    /// Resolve a parameter file and report the system it describes without sampling.
    Check(CheckArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// The parameter file and everything that may override it.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Path to the parameter file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory that receives all output files.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Load the bonded parameters from a standalone forcefield TOML file,
    /// replacing the `[forcefield]` section of the parameter file.
    #[arg(long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    // --- Sampling Overrides ---
    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u32>,

    /// Override the number of sweeps.
    #[arg(long, value_name = "INT")]
    pub sweeps: Option<u64>,

    /// Override the maximum displacement per axis of a trial move.
    #[arg(long, value_name = "FLOAT")]
    pub step_length: Option<f64>,

    // --- Restart ---
    /// Start from the positions stored in a binary restart file.
    #[arg(long, value_name = "PATH")]
    pub restart: Option<PathBuf>,

    /// Write the final configuration as a restart file after the last sweep.
    #[arg(long)]
    pub write_final_config: bool,

    /// Set a specific configuration value, overriding the parameter file.
    /// Can be used multiple times. Example: -S sampling.total-sweeps=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
