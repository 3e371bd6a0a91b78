use colored::Colorize;
use std::fmt;
use std::process;

use crate::config::ConfigFileError;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Fatal errors. Row-level lookup failures never reach this type.
pub enum CliError {
    /// Config file missing, unreadable or malformed.
    Config(ConfigFileError),
    /// Setting out of range or unparseable.
    Usage(String),
    /// Input file missing, unreadable, or without a header row.
    Input(String),
    /// Output path not writable.
    Output(String),
    /// HTTP client could not be constructed.
    Client(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Usage(msg) => write!(
                f,
                "{} {msg}\n  {} run 'mesh-enrich --help' for the accepted values",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Output(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Client(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        match e {
            ConfigFileError::InvalidValue(msg) => CliError::Usage(msg),
            other => CliError::Config(other),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        CliError::Client(format!("failed to build HTTP client: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
