//! Configuration types for the sales data pipeline.
//!
//! Uses the builder pattern for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grouping columns the aggregator looks for, in output order.
pub const DEFAULT_GROUP_COLUMNS: [&str; 3] = ["fuelType", "transmission", "model"];

/// Column whose per-group mean is reported when present.
pub const DEFAULT_PRICE_COLUMN: &str = "price";

/// Configuration for the pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a configuration with a
/// fluent API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output directory for the cleaned table and summary files.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Destination table name for the database upload.
    /// Default: "car_sales"
    pub table_name: String,

    /// Candidate grouping columns; only those present in the dataset
    /// produce a summary file.
    pub group_columns: Vec<String>,

    /// Numeric column whose per-group mean is included in summaries when
    /// the column exists.
    pub price_column: String,

    /// Number of rows per INSERT batch on the database upload. Transport
    /// batching only; a mid-run failure is not rolled back.
    /// Default: 1000
    pub insert_chunk_size: usize,

    /// Skip the database step entirely and only write files.
    /// Default: false
    pub export_only: bool,

    /// Database connection string. Required unless `export_only` is set.
    pub db_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            table_name: "car_sales".to_string(),
            group_columns: DEFAULT_GROUP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            insert_chunk_size: 1000,
            export_only: false,
            db_url: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.insert_chunk_size == 0 {
            return Err(ConfigValidationError::InvalidChunkSize(
                self.insert_chunk_size,
            ));
        }

        if self.table_name.is_empty() {
            return Err(ConfigValidationError::EmptyTableName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid insert chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    #[error("Destination table name must not be empty")]
    EmptyTableName,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    output_dir: Option<PathBuf>,
    table_name: Option<String>,
    group_columns: Option<Vec<String>>,
    price_column: Option<String>,
    insert_chunk_size: Option<usize>,
    export_only: Option<bool>,
    db_url: Option<String>,
}

impl PipelineConfigBuilder {
    /// Set the output directory for the cleaned table and summaries.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the destination table name.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Set the candidate grouping columns.
    pub fn group_columns(mut self, columns: Vec<String>) -> Self {
        self.group_columns = Some(columns);
        self
    }

    /// Set the column whose per-group mean is reported.
    pub fn price_column(mut self, column: impl Into<String>) -> Self {
        self.price_column = Some(column.into());
        self
    }

    /// Set the number of rows per INSERT batch.
    pub fn insert_chunk_size(mut self, size: usize) -> Self {
        self.insert_chunk_size = Some(size);
        self
    }

    /// Skip the database step and only write files.
    pub fn export_only(mut self, export_only: bool) -> Self {
        self.export_only = Some(export_only);
        self
    }

    /// Set the database connection string.
    pub fn db_url(mut self, url: impl Into<String>) -> Self {
        self.db_url = Some(url.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            table_name: self.table_name.unwrap_or(defaults.table_name),
            group_columns: self.group_columns.unwrap_or(defaults.group_columns),
            price_column: self.price_column.unwrap_or(defaults.price_column),
            insert_chunk_size: self.insert_chunk_size.unwrap_or(defaults.insert_chunk_size),
            export_only: self.export_only.unwrap_or(false),
            db_url: self.db_url,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.table_name, "car_sales");
        assert_eq!(config.insert_chunk_size, 1000);
        assert_eq!(config.group_columns, vec!["fuelType", "transmission", "model"]);
        assert!(!config.export_only);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .output_dir("results")
            .table_name("listings")
            .insert_chunk_size(500)
            .export_only(true)
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.table_name, "listings");
        assert_eq!(config.insert_chunk_size, 500);
        assert!(config.export_only);
    }

    #[test]
    fn test_validation_rejects_zero_chunk_size() {
        let result = PipelineConfig::builder().insert_chunk_size(0).build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidChunkSize(0)
        ));
    }

    #[test]
    fn test_validation_rejects_empty_table_name() {
        let result = PipelineConfig::builder().table_name("").build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyTableName
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.table_name, deserialized.table_name);
        assert_eq!(config.insert_chunk_size, deserialized.insert_chunk_size);
    }
}
