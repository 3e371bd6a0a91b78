//! Logging setup

use crate::cli::EnrichConfig;
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Default filter when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LEVEL: &str = "info";

/// Level names accepted in `--log-level`, lowercase.
const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Log filter for a run:
///   --quiet     → "off"
///   --log-level → that level or filter directive
///   RUST_LOG    → honoured when --log-level is not given
///   otherwise   → "info"
pub fn log_filter(config: &EnrichConfig) -> CliResult<EnvFilter> {
    if config.quiet {
        return Ok(EnvFilter::new("off"));
    }
    match &config.log_level {
        Some(level) => {
            let directives = normalize_levels(level)?;
            EnvFilter::try_new(&directives)
                .map_err(|e| CliError::Usage(format!("invalid --log-level '{level}': {e}")))
        }
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LEVEL.into())),
    }
}

/// Lowercase level names in a `--log-level` value and accept `warning`
/// for `warn`.
///
/// A bare word is always a level here; `EnvFilter` would otherwise read an
/// unknown one as a target name and silently match nothing.
fn normalize_levels(value: &str) -> CliResult<String> {
    let mut out = Vec::new();
    for directive in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let (target, level) = match directive.rsplit_once('=') {
            Some((target, level)) => (Some(target), level),
            None => (None, directive),
        };
        let level = level.to_ascii_lowercase();
        let level = if level == "warning" { "warn".to_string() } else { level };
        match target {
            None if !LEVELS.contains(&level.as_str()) => {
                return Err(CliError::Usage(format!(
                    "invalid --log-level '{value}': unknown level '{directive}' (expected one of {})",
                    LEVELS.join(", ")
                )));
            }
            None => out.push(level),
            Some(target) if LEVELS.contains(&level.as_str()) => out.push(format!("{target}={level}")),
            // span/field directives and other syntax go through unchanged
            Some(_) => out.push(directive.to_string()),
        }
    }
    Ok(out.join(","))
}

pub fn use_ansi(config: &EnrichConfig) -> bool {
    !(config.no_color || std::env::var_os("NO_COLOR").is_some())
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(config: &EnrichConfig) -> CliResult<()> {
    let filter = log_filter(config)?;

    if tracing::dispatcher::has_been_set() {
        tracing::debug!("tracing subscriber already initialized, skipping");
        return Ok(());
    }

    // try_init so a subscriber installed concurrently (tests) is not a panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi(config))
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
