//! Command-line arguments and resolved run settings

use crate::error::{CliError, CliResult};
use crate::tabular::{InputDelimiter, OutputFormat};
use clap::Parser;
use mesh_enrich_core::{ClientConfig, OutputShape};
use mesh_vocab::{columns, service};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "./data/ctd-mesh-ids.tsv";
pub const DEFAULT_OUTPUT: &str = "./data/ctd-mesh-ids-enriched.csv";

/// Enrich a table of MeSH identifiers with tree numbers and categories
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mesh-enrich",
    about = "Enrich a table of MeSH identifiers with tree numbers and top-level categories",
    version
)]
pub struct EnrichConfig {
    /// Input table, as an alternative to --input
    #[arg(value_name = "INPUT_FILE", conflicts_with = "input")]
    pub input_file: Option<PathBuf>,

    /// Input table (header row required)
    #[arg(long, short = 'i', env = "MESH_ENRICH_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output table
    #[arg(long, short = 'o', env = "MESH_ENRICH_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Column holding the MESH:-prefixed identifier
    #[arg(long, env = "MESH_ENRICH_ID_COLUMN", default_value = columns::DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Minimum seconds between two requests to the service
    #[arg(long, short = 'd', env = "MESH_ENRICH_DELAY", default_value = "0.2")]
    pub delay: f64,

    /// Per-request timeout in seconds
    #[arg(long, env = "MESH_ENRICH_TIMEOUT", default_value = "10")]
    pub timeout: f64,

    /// Rows resolved concurrently (output order is preserved)
    #[arg(long, short = 'j', env = "MESH_ENRICH_CONCURRENCY", default_value = "1")]
    pub concurrency: usize,

    /// MeSH RDF service base URL
    #[arg(long, env = "MESH_ENRICH_BASE_URL", default_value = service::BASE_URL)]
    pub base_url: String,

    /// SPARQL endpoint (defaults to <base-url>/sparql)
    #[arg(long, env = "MESH_ENRICH_SPARQL_URL")]
    pub sparql_url: Option<String>,

    /// Columns to append: hierarchical or categories
    #[arg(long, env = "MESH_ENRICH_SHAPE", default_value = "hierarchical")]
    pub shape: OutputShape,

    /// Output format (inferred from the output extension when omitted)
    #[arg(long, env = "MESH_ENRICH_OUTPUT_FORMAT", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Input field separator
    #[arg(long, env = "MESH_ENRICH_INPUT_DELIMITER", value_enum, default_value = "tab")]
    pub input_delimiter: InputDelimiter,

    /// Maximum top-level codes remembered
    #[arg(long, env = "MESH_ENRICH_CACHE_CAPACITY", default_value = "1000")]
    pub cache_capacity: usize,

    /// Log level or filter (trace, debug, info, warn, error); RUST_LOG applies when unset
    #[arg(long, env = "MESH_ENRICH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Suppress logs and the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Path to config file (defaults to ./mesh-enrich.toml when present)
    #[arg(long, env = "MESH_ENRICH_CONFIG")]
    pub config: Option<PathBuf>,
}

impl EnrichConfig {
    /// Move a positional `INPUT_FILE` into `input`. Runs after the config
    /// file is merged so the command line still wins.
    pub fn apply_positional_input(&mut self) {
        if let Some(path) = self.input_file.take() {
            self.input = path;
        }
    }

    /// Check ranges and URLs once every source has been merged.
    pub fn validate(&self) -> CliResult<()> {
        if self.concurrency == 0 {
            return Err(CliError::Usage("--concurrency must be at least 1".into()));
        }
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            return Err(CliError::Usage(format!(
                "--timeout must be a positive number of seconds, got {}",
                self.timeout
            )));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(CliError::Usage(format!(
                "--delay must be zero or more seconds, got {}",
                self.delay
            )));
        }
        if self.id_column.trim().is_empty() {
            return Err(CliError::Usage("--id-column must not be empty".into()));
        }
        check_url("--base-url", &self.base_url)?;
        if let Some(url) = &self.sparql_url {
            check_url("--sparql-url", url)?;
        }
        Ok(())
    }

    /// Client settings. Out-of-range durations fall back to the client
    /// defaults; [`validate`](Self::validate) rejects them first.
    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.clone(),
            sparql_url: self.sparql_url.clone(),
            timeout: Duration::try_from_secs_f64(self.timeout).unwrap_or(defaults.timeout),
            request_spacing: Duration::try_from_secs_f64(self.delay)
                .unwrap_or(defaults.request_spacing),
        }
    }

    pub fn resolved_output_format(&self) -> OutputFormat {
        self.output_format
            .unwrap_or_else(|| OutputFormat::infer(&self.output))
    }

    pub fn show_progress(&self) -> bool {
        !(self.quiet || self.no_progress)
    }
}

fn check_url(flag: &str, value: &str) -> CliResult<()> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(CliError::Usage(format!(
            "{flag} must be an http(s) URL, got scheme '{}'",
            url.scheme()
        ))),
        Err(e) => Err(CliError::Usage(format!("{flag} '{value}' is not a valid URL: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> EnrichConfig {
        let mut argv = vec!["mesh-enrich"];
        argv.extend_from_slice(args);
        EnrichConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&[]);
        assert_eq!(cfg.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(cfg.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(cfg.id_column, "CTD-ASSIGNED CONCEPT ID");
        assert_eq!(cfg.delay, 0.2);
        assert_eq!(cfg.timeout, 10.0);
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.cache_capacity, 1000);
        assert_eq!(cfg.shape, OutputShape::Hierarchical);
        assert_eq!(cfg.input_delimiter, InputDelimiter::Tab);
        assert_eq!(cfg.resolved_output_format(), OutputFormat::Csv);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_client_config_from_flags() {
        let cfg = parse(&[
            "--delay",
            "0",
            "--timeout",
            "2.5",
            "--base-url",
            "http://127.0.0.1:8080/mesh",
        ]);
        let client = cfg.client_config();
        assert_eq!(client.request_spacing, Duration::ZERO);
        assert_eq!(client.timeout, Duration::from_millis(2500));
        assert_eq!(client.base_url, "http://127.0.0.1:8080/mesh");
        assert_eq!(client.sparql_url, None);
    }

    #[test]
    fn test_shape_and_format_flags() {
        let cfg = parse(&[
            "--shape",
            "categories",
            "--output",
            "out.tsv",
            "--input-delimiter",
            "comma",
        ]);
        assert_eq!(cfg.shape, OutputShape::Categories);
        assert_eq!(cfg.resolved_output_format(), OutputFormat::Tsv);
        assert_eq!(cfg.input_delimiter, InputDelimiter::Comma);

        let cfg = parse(&["--output", "out.tsv", "--output-format", "csv"]);
        assert_eq!(cfg.resolved_output_format(), OutputFormat::Csv);
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(EnrichConfig::try_parse_from(["mesh-enrich", "--shape", "flat"]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            parse(&["--concurrency", "0"]).validate(),
            Err(CliError::Usage(_))
        ));
        assert!(parse(&["--timeout", "0"]).validate().is_err());
        assert!(parse(&["--delay=-1"]).validate().is_err());
        assert!(parse(&["--base-url", "not a url"]).validate().is_err());
        assert!(parse(&["--sparql-url", "ftp://example.org/sparql"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_positional_input_and_short_delay() {
        let mut cfg = parse(&["ids.tsv", "-d", "0.5"]);
        cfg.apply_positional_input();
        assert_eq!(cfg.input, PathBuf::from("ids.tsv"));
        assert_eq!(cfg.input_file, None);
        assert_eq!(cfg.delay, 0.5);
        assert_eq!(cfg.client_config().request_spacing, Duration::from_millis(500));
    }

    #[test]
    fn test_positional_input_conflicts_with_flag() {
        assert!(
            EnrichConfig::try_parse_from(["mesh-enrich", "a.tsv", "--input", "b.tsv"]).is_err()
        );
    }

    #[test]
    fn test_progress_visibility() {
        assert!(parse(&[]).show_progress());
        assert!(!parse(&["--quiet"]).show_progress());
        assert!(!parse(&["--no-progress"]).show_progress());
    }
}
