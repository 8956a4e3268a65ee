use colored::Colorize;
use std::fmt;
use std::process;

/// Exit codes for the CLI. Success is the default process exit.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Error from the cache codec.
    Codec(metacache_core::MetaCacheError),
    /// Configuration file issues.
    Config(String),
    /// Bad file path, unreadable input, parse failure.
    Input(String),
    /// Argument / usage errors.
    Usage(String),
    /// `compare` found differences (already printed).
    Differences(usize),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Codec(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Config(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Differences(n) => write!(
                f,
                "{} caches differ ({n} difference{})",
                "error:".red().bold(),
                if *n == 1 { "" } else { "s" }
            ),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<metacache_core::MetaCacheError> for CliError {
    fn from(e: metacache_core::MetaCacheError) -> Self {
        CliError::Codec(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON parse error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    process::exit(exit_code(&err))
}

/// Exit code `err` maps to.
pub fn exit_code(err: &CliError) -> i32 {
    match err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;
