//! Error types for index construction, ingestion and configuration.

use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Queries never produce an error: a radius search returns a possibly-empty list.
#[derive(Error, Debug)]
pub enum NearJobsError {
    /// The index was built from an empty job collection.
    #[error("cannot build an index from an empty job collection")]
    EmptyInput,

    /// Internal consistency of the tree is broken. Always a bug.
    #[error("index invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, NearJobsError>;
