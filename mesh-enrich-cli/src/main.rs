use clap::{CommandFactory, FromArgMatches};
use mesh_enrich_cli::cli::EnrichConfig;
use mesh_enrich_cli::error::{exit_with_error, CliResult};
use mesh_enrich_cli::{configure, run, telemetry};
use std::path::Path;

#[tokio::main]
async fn main() {
    let matches = EnrichConfig::command().get_matches();
    let mut config = match EnrichConfig::from_arg_matches(&matches) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    // Errors go to stderr, so piping does not strip color; only the
    // flag or NO_COLOR does.
    if config.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    if let Err(e) = start(&mut config, &matches).await {
        exit_with_error(e);
    }
}

async fn start(config: &mut EnrichConfig, matches: &clap::ArgMatches) -> CliResult<()> {
    let applied = configure(config, matches, Path::new("."))?;
    telemetry::init_logging(config)?;
    if let Some(path) = applied {
        tracing::debug!(path = %path.display(), "applied config file");
    }

    run(config).await?;
    Ok(())
}
