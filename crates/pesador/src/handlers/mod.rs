//! Subcommand handlers

pub mod init;
pub mod list;
pub mod run;
