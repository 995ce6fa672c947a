//! Pesador CLI: scenario runner for the Pesar testing layer
//!
//! ## Usage
//!
//! ```bash
//! pesador init                      # Scaffold pesar.yaml + example scenario
//! pesador list --cases              # Show discovered scenarios
//! pesador run --dry-run             # Execute against the in-memory page
//! pesador run --filter "boundary"   # Live run, filtered
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use pesador::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};
use pesar::SuiteConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) if code == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<i32> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    // The suite root is the config file's directory.
    let root = cli
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let suite = if cli.config.exists() {
        SuiteConfig::load(&cli.config)?
    } else {
        SuiteConfig::default()
    };

    match cli.command {
        Commands::Run(args) => handlers::run::run(&config, &suite, &root, &args),
        Commands::List(args) => {
            handlers::list::run(&config, &suite, &root, &args)?;
            Ok(0)
        }
        Commands::Init(args) => {
            handlers::init::run(&config, &args)?;
            Ok(0)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };
    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.clone().into())
}
