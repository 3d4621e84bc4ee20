//! Error types shared by the solver library.

use thiserror::Error;

/// Errors raised by instance loading, configuration checks and the ACO core.
#[derive(Debug, Error)]
pub enum AcoError {
    /// A configuration value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cost provider returned a value the core refuses to consume.
    #[error("invalid provider response for edge {from} -> {to}: {value}")]
    InvalidProviderResponse { from: usize, to: usize, value: f64 },

    /// The instance data could not be turned into stations or a matrix.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type AcoResult<T> = Result<T, AcoError>;
