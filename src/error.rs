//! Custom error types for the sales data pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. None of these
//! errors are caught or retried inside the pipeline; every failure surfaces
//! immediately and aborts the run.

use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Upload was requested but no connection string was available.
    #[error(
        "No database URL provided. Use --db-url or set the DATABASE_URL environment variable"
    )]
    MissingDbUrl,

    /// Input file missing or not parseable as delimited text.
    #[error("Failed to read input '{path}': {reason}")]
    Read { path: String, reason: String },

    /// Output directory/file write failure, or database write failure.
    #[error("Failed to write {target}: {reason}")]
    Write { target: String, reason: String },

    /// Database is unreachable.
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_db_url_message() {
        let error = PipelineError::MissingDbUrl;
        assert!(error.to_string().contains("--db-url"));
        assert!(error.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_read_error_names_path() {
        let error = PipelineError::Read {
            path: "data/missing.csv".to_string(),
            reason: "file not found".to_string(),
        };
        assert!(error.to_string().contains("data/missing.csv"));
    }

    #[test]
    fn test_with_context() {
        let error =
            PipelineError::ColumnNotFound("price".to_string()).with_context("During aggregation");
        assert!(error.to_string().contains("During aggregation"));
        assert!(error.to_string().contains("price"));
    }
}
