//! Core library entry for the `erised` CLI.
//!
//! `erised` partitions the files changed on a working branch into
//! boundaries, mirrors each boundary to its own single-commit branch, and
//! keeps one pull request per mirrored branch.

pub mod adapters;
pub mod boundary;
pub mod changeset;
pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod mirror;
pub mod ports;
pub mod preferences;
pub mod status;
pub mod upload;

pub use error::{Error, Result};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
