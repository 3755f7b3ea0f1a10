//! CSV ingestion.
//!
//! Reads a delimited text file into a [`DataFrame`]. Column names come from
//! the header row; cell types from polars schema inference over a bounded
//! window.

use crate::error::{PipelineError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Number of rows polars inspects when inferring the schema.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file into a DataFrame.
///
/// Fails with [`PipelineError::Read`] when the path does not exist or the
/// content is not parseable as delimited text. No side effects.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipelineError::Read {
            path: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| PipelineError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    debug!("Loaded {} rows x {} columns from {}", df.height(), df.width(), path.display());

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv("does/not/exist.csv");
        assert!(matches!(result, Err(PipelineError::Read { .. })));
    }

    #[test]
    fn test_load_csv_reads_header_and_rows() {
        let dir = std::env::temp_dir().join("car_sales_pipeline_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "price,fuelType").unwrap();
        writeln!(file, "20000,petrol").unwrap();
        writeln!(file, ",diesel").unwrap();

        let df = load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["price", "fuelType"]);
    }
}
