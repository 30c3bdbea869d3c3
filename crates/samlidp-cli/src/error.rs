//! CLI error types.

use thiserror::Error;

use samlidp_metadata::SamlError;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Metadata generation or signature error.
    #[error(transparent)]
    Saml(#[from] SamlError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
