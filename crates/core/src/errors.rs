//! Core error types for the portfolio analyzer.
//!
//! Every failure the engine reports is a deterministic input failure: the
//! caller can retry with corrected input. Collaborator failures (storage,
//! ticker data) are carried in string form so this type stays
//! storage-agnostic.

use thiserror::Error;

use crate::cost_basis::CostBasisError;
use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio analyzer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cost basis calculation failed: {0}")]
    CostBasis(#[from] CostBasisError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Market data operation failed: {0}")]
    MarketData(String),
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfigValue(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
