//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use geedar::code::CodeError;
use geedar::compute::GatewayError;
use geedar::config::ConfigFileError;
use geedar::input::InputError;

/// Exit code for unusable arguments or input files.
const EXIT_USAGE: i32 = 2;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Invalid processing code
    Code(CodeError),
    /// Unusable input table
    Input(InputError),
    /// Failed to read a file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Failed to write a file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// Malformed CSV
    Csv { path: PathBuf, error: csv::Error },
    /// Malformed region catalog
    Regions { path: PathBuf, reason: String },
    /// Failed to create the compute client
    Gateway(GatewayError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_)
            | CliError::Code(_)
            | CliError::Input(_)
            | CliError::Csv { .. }
            | CliError::Regions { .. } => EXIT_USAGE,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Code(_) => {
                eprintln!();
                eprintln!("Run 'geedar codes list' to see the available ids.");
            }
            CliError::Input(InputError::MissingColumns(_)) => {
                eprintln!();
                eprintln!("The input needs either:");
                eprintln!("  1. a 'date' column plus 'id' and/or 'lat' and 'long'");
                eprintln!("  2. 'start_date' and 'end_date' columns plus 'id' and/or 'lat' and 'long'");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Code(e) => write!(f, "{}", e),
            CliError::Input(e) => write!(f, "Invalid input: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Csv { path, error } => {
                write!(f, "Failed to parse CSV '{}': {}", path.display(), error)
            }
            CliError::Regions { path, reason } => {
                write!(f, "Invalid region file '{}': {}", path.display(), reason)
            }
            CliError::Gateway(e) => write!(f, "Failed to create compute client: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Code(e) => Some(e),
            CliError::Input(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Csv { error, .. } => Some(error),
            CliError::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CodeError> for CliError {
    fn from(e: CodeError) -> Self {
        CliError::Code(e)
    }
}

impl From<InputError> for CliError {
    fn from(e: InputError) -> Self {
        CliError::Input(e)
    }
}

impl From<GatewayError> for CliError {
    fn from(e: GatewayError) -> Self {
        CliError::Gateway(e)
    }
}
