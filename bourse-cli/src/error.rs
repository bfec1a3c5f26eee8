//! CLI error types.

use bourse_exchange::ExchangeError;
use thiserror::Error;

/// CLI-level errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Exchange error
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
