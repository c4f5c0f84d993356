//! Common error types for CRS
//!
//! Three categories carry pipeline meaning:
//! - [`Error::Config`]: keyword or equivalency configuration is missing or
//!   malformed. Fatal for any scoring step that needs the registry.
//! - [`Error::InputParse`]: one input file could not be read as a record
//!   batch. Logged, the file is skipped, the batch continues.
//! - [`Error::MissingInput`]: an expected file or directory is absent.
//!   Logged and treated as zero-sized input.
//!
//! The remaining variants wrap library errors so `?` works throughout.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for CRS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CRS pipeline stages
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One input file is not a parseable list of records
    #[error("Could not parse input {path}: {reason}")]
    InputParse { path: PathBuf, reason: String },

    /// Expected input file or directory is absent
    #[error("Missing input: {0}")]
    MissingInput(PathBuf),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors that only affect one file or school and should be
    /// logged and skipped rather than aborting a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InputParse { .. } | Error::MissingInput(_))
    }
}
