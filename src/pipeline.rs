//! Pipeline orchestration.
//!
//! Runs the stages in order: load, impute, aggregate, and (unless
//! export-only) the database upload. Each stage consumes the prior stage's
//! output in full; a failure at any stage aborts the run, leaving files
//! already written on disk.

use crate::aggregator::Aggregator;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::imputers::StatisticalImputer;
use crate::loader::load_csv;
use chrono::Local;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[cfg(feature = "db")]
use crate::db::{PostgresSink, TableSink};
#[cfg(feature = "db")]
use std::sync::Arc;

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Timestamp when the run finished.
    pub completed_at: String,
    /// Rows in the cleaned table.
    pub rows: usize,
    /// Columns in the cleaned table.
    pub columns: usize,
    /// Grouping columns for which a summary file was written.
    pub summaries_written: Vec<String>,
    /// Directory holding the cleaned table and summaries.
    pub output_dir: PathBuf,
    /// Rows written to the database, when the upload ran.
    pub rows_uploaded: Option<u64>,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

/// The sales data pipeline.
///
/// Use [`Pipeline::builder()`] to construct one.
///
/// # Example
///
/// ```rust,ignore
/// use car_sales_pipeline::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .output_dir("output")
///     .export_only(true)
///     .build()?;
///
/// let result = Pipeline::builder().config(config).build()?.run("sales.csv")?;
/// println!("{} rows cleaned", result.rows);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    #[cfg(feature = "db")]
    sink: Option<Arc<dyn TableSink>>,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run the pipeline on the CSV file at `csv_path`.
    pub fn run(&self, csv_path: impl AsRef<Path>) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let csv_path = csv_path.as_ref();

        info!("Loading dataset from {}", csv_path.display());
        let df = load_csv(csv_path)?;
        info!("Dataset loaded: {} rows x {} columns", df.height(), df.width());

        info!("Imputing missing values");
        let cleaned = StatisticalImputer::impute(&df)?;

        info!("Writing summaries to {}", self.config.output_dir.display());
        let summaries = Aggregator::aggregate(&cleaned, &self.config)?;

        let rows_uploaded = if self.config.export_only {
            None
        } else {
            Some(self.upload(&cleaned)?)
        };

        Ok(PipelineResult {
            completed_at: Local::now().to_rfc3339(),
            rows: cleaned.height(),
            columns: cleaned.width(),
            summaries_written: summaries.keys().cloned().collect(),
            output_dir: self.config.output_dir.clone(),
            rows_uploaded,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Bulk-write the cleaned table to the configured destination table.
    #[cfg(feature = "db")]
    fn upload(&self, df: &DataFrame) -> Result<u64> {
        let sink: Arc<dyn TableSink> = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => {
                let db_url = self
                    .config
                    .db_url
                    .as_deref()
                    .ok_or(PipelineError::MissingDbUrl)?;
                Arc::new(
                    PostgresSink::connect(db_url)?
                        .with_chunk_size(self.config.insert_chunk_size),
                )
            }
        };

        info!(
            "Uploading {} rows to table '{}' via {}",
            df.height(),
            self.config.table_name,
            sink.name()
        );
        sink.replace_table(df, &self.config.table_name)
    }

    /// Fallback when database support is not compiled in.
    #[cfg(not(feature = "db"))]
    fn upload(&self, _df: &DataFrame) -> Result<u64> {
        self.config
            .db_url
            .as_deref()
            .ok_or(PipelineError::MissingDbUrl)?;
        Err(PipelineError::InvalidConfig(
            "database upload requires the 'db' feature; rerun with --export-only".to_string(),
        ))
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    #[cfg(feature = "db")]
    sink: Option<Arc<dyn TableSink>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a table sink, replacing the default PostgreSQL sink.
    ///
    /// Useful for tests and alternative stores.
    #[cfg(feature = "db")]
    pub fn sink(mut self, sink: Arc<dyn TableSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

        Ok(Pipeline {
            config,
            #[cfg(feature = "db")]
            sink: self.sink,
        })
    }
}
