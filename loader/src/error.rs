//! Error types for the sfload pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV reading/parsing errors
//! - [`UpsertError`] - sf CLI invocation and response errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors during CSV reading and parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Upsert Errors
// =============================================================================

/// Errors from invoking the sf CLI and interpreting its response.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// No default org is configured and none was supplied.
    #[error("No default org configured. Set one with `sf config set target-org <alias>` or run `sf org login web`")]
    UnconfiguredOrg,

    /// The CLI returned something that is neither JSON nor a known prompt.
    #[error("Unexpected response from sf CLI: {0}")]
    MalformedResponse(String),

    /// The CLI returned a JSON envelope with a non-zero status.
    #[error("sf command failed: {0}")]
    CommandFailed(String),

    /// The sf process could not be started or exited abnormally.
    #[error("Failed to invoke sf CLI: {0}")]
    Invocation(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the per-dataset error type produced by [`crate::pipeline`].
/// Every variant is caught by the load loop and converted into a failure
/// flag for that dataset only; the loop continues with the next dataset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source CSV file does not exist.
    #[error("Source file not found: {0}")]
    MissingSource(PathBuf),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Upsert error.
    #[error("Upsert error: {0}")]
    Upsert(#[from] UpsertError),

    /// Filesystem error while staging the batch file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for upsert operations.
pub type UpsertResult<T> = Result<T, UpsertError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // UpsertError -> PipelineError
        let upsert_err = UpsertError::UnconfiguredOrg;
        let pipeline_err: PipelineError = upsert_err.into();
        assert!(pipeline_err.to_string().contains("target-org"));
    }

    #[test]
    fn test_missing_source_format() {
        let err = PipelineError::MissingSource(PathBuf::from("test-data/Products.csv"));
        assert!(err.to_string().contains("Products.csv"));
    }
}
