//! Pesador CLI Library
//!
//! Command-line interface for the Pesar testing layer: scenario discovery,
//! dry-run and live execution, and project scaffolding.

#![warn(missing_docs)]

mod commands;
mod config;
pub mod discovery;
mod error;
pub mod handlers;

pub use commands::{Cli, ColorArg, Commands, InitArgs, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use discovery::discover_scenarios;
pub use error::{CliError, CliResult};
