//! Configuration file support
//!
//! Settings may also come from a TOML file with an `[enrich]` section,
//! named by `--config` or found as `./mesh-enrich.toml`.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI arguments
//! 2. Environment variables (`MESH_ENRICH_*`)
//! 3. Config file (`[enrich]`)
//! 4. Hardcoded defaults

use crate::cli::EnrichConfig;
use crate::tabular::{InputDelimiter, OutputFormat};
use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use mesh_enrich_core::OutputShape;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mesh-enrich.toml";

/// Top-level config file structure; unknown sections are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct MeshFileConfig {
    #[serde(default)]
    pub enrich: Option<EnrichFileConfig>,
}

/// The `[enrich]` section. Every field is `Option` so the file only needs to
/// contain values the user wants to set.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EnrichFileConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub id_column: Option<String>,
    pub delay: Option<f64>,
    pub timeout: Option<f64>,
    pub concurrency: Option<usize>,
    pub base_url: Option<String>,
    pub sparql_url: Option<String>,
    pub shape: Option<String>,
    pub output_format: Option<String>,
    pub input_delimiter: Option<String>,
    pub cache_capacity: Option<usize>,
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {detail}")]
    Parse { path: PathBuf, detail: String },
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Load a TOML config file. An empty file is an empty config.
pub fn load_config(path: &Path) -> Result<MeshFileConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(MeshFileConfig::default());
    }
    toml::from_str(&content).map_err(|e| ConfigFileError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// The config file to use: the explicit path (which must exist), or
/// `mesh-enrich.toml` in `dir` when present.
pub fn discover(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        }
    }
}

/// Load the discovered config file (if any) and apply it to `config`.
/// Returns the path that was applied.
pub fn load_and_merge(
    config: &mut EnrichConfig,
    matches: &ArgMatches,
    dir: &Path,
) -> Result<Option<PathBuf>, ConfigFileError> {
    let Some(path) = discover(config.config.as_deref(), dir) else {
        return Ok(None);
    };
    let file = load_config(&path)?;
    if let Some(section) = &file.enrich {
        apply_to_enrich_config(section, config, matches)?;
    }
    Ok(Some(path))
}

/// Apply file values to `config`, but only for fields the user did NOT
/// set through a CLI argument or environment variable.
pub fn apply_to_enrich_config(
    file: &EnrichFileConfig,
    config: &mut EnrichConfig,
    matches: &ArgMatches,
) -> Result<(), ConfigFileError> {
    // clap derive uses the field name (underscores) as the arg ID.
    let is_default = |arg_name: &str| -> bool {
        matches!(
            matches.value_source(arg_name),
            None | Some(ValueSource::DefaultValue)
        )
    };

    if is_default("input") {
        if let Some(v) = &file.input {
            config.input = v.clone();
        }
    }
    if is_default("output") {
        if let Some(v) = &file.output {
            config.output = v.clone();
        }
    }
    if is_default("id_column") {
        if let Some(v) = &file.id_column {
            config.id_column = v.clone();
        }
    }
    if is_default("delay") {
        if let Some(v) = file.delay {
            config.delay = v;
        }
    }
    if is_default("timeout") {
        if let Some(v) = file.timeout {
            config.timeout = v;
        }
    }
    if is_default("concurrency") {
        if let Some(v) = file.concurrency {
            config.concurrency = v;
        }
    }
    if is_default("base_url") {
        if let Some(v) = &file.base_url {
            config.base_url = v.clone();
        }
    }
    if is_default("sparql_url") {
        if let Some(v) = &file.sparql_url {
            config.sparql_url = Some(v.clone());
        }
    }
    if is_default("shape") {
        if let Some(v) = &file.shape {
            config.shape = v
                .parse::<OutputShape>()
                .map_err(|e| ConfigFileError::InvalidValue(format!("shape: {e}")))?;
        }
    }
    if is_default("output_format") {
        if let Some(v) = &file.output_format {
            config.output_format = Some(
                OutputFormat::from_str(v, true)
                    .map_err(|e| ConfigFileError::InvalidValue(format!("output_format: {e}")))?,
            );
        }
    }
    if is_default("input_delimiter") {
        if let Some(v) = &file.input_delimiter {
            config.input_delimiter = InputDelimiter::from_str(v, true)
                .map_err(|e| ConfigFileError::InvalidValue(format!("input_delimiter: {e}")))?;
        }
    }
    if is_default("cache_capacity") {
        if let Some(v) = file.cache_capacity {
            config.cache_capacity = v;
        }
    }
    if is_default("log_level") {
        if let Some(v) = &file.log_level {
            config.log_level = Some(v.clone());
        }
    }
    Ok(())
}

/// Arg IDs read by [`apply_to_enrich_config`].
pub const CONFIG_FILE_ARG_IDS: &[&str] = &[
    "input",
    "output",
    "id_column",
    "delay",
    "timeout",
    "concurrency",
    "base_url",
    "sparql_url",
    "shape",
    "output_format",
    "input_delimiter",
    "cache_capacity",
    "log_level",
];
