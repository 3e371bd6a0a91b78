//! MeSH enrichment CLI library.
//!
//! The types and run logic behind the `mesh-enrich` binary. The binary
//! parses arguments, calls [`configure`], installs logging and then awaits
//! [`pipeline::run`].

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod tabular;
pub mod telemetry;

use clap::ArgMatches;
use cli::EnrichConfig;
use std::path::{Path, PathBuf};

pub use pipeline::run;

/// Merge the config file into `config` and validate the result.
///
/// `dir` is where `mesh-enrich.toml` is looked up when `--config` is not
/// given. Returns the config file that was applied, if any.
pub fn configure(
    config: &mut EnrichConfig,
    matches: &ArgMatches,
    dir: &Path,
) -> error::CliResult<Option<PathBuf>> {
    let applied = crate::config::load_and_merge(config, matches, dir)?;
    config.apply_positional_input();
    config.validate()?;
    Ok(applied)
}
