//! Error types for clinspan.
//!
//! Matching itself never fails: normalization is total, candidate generation
//! yields nothing when a pass has no evidence, and unmappable candidates are
//! dropped as diagnostics. Errors only come from the edges: label parsing,
//! sentence spans that do not fit their document, configuration, file I/O
//! and corpus evaluation under a strict policy.

use thiserror::Error;

/// Result type for clinspan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clinspan operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Label or value could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Evaluation could not be carried out.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }
}
