//! Error types for the CLI

use core_types::LoaderError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The loader rejected a request or configuration
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced
    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed command or argument
    #[error("Usage error: {0}")]
    Usage(String),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
