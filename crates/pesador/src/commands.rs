//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ColorChoice;

/// Pesador: CLI for Pesar - resilient browser testing for third-party pages
#[derive(Parser, Debug)]
#[command(name = "pesador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Path to the suite configuration file
    #[arg(short, long, default_value = "pesar.yaml", global = true)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Run(RunArgs),

    /// List discovered scenarios and their cases
    List(ListArgs),

    /// Scaffold a suite configuration and an example scenario
    Init(InitArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Filter scenarios/cases by substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Execute against the in-memory page model instead of a browser
    #[arg(long)]
    pub dry_run: bool,

    /// Run with a headed (visible) browser
    #[arg(long)]
    pub headed: bool,

    /// Override the configured base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Stop at the first failing case
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Also list the cases inside each scenario
    #[arg(long)]
    pub cases: bool,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to scaffold into
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

/// Color argument for clap
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
