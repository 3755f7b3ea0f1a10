//! Statistical imputation for missing values.
//!
//! Numeric columns are coerced to f64 and mean-filled; categorical columns
//! are mode-filled. A column with no usable values is left unchanged.

use crate::error::Result;
use crate::profiler::{ColumnKind, profile_columns};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, parse_numeric_string, string_mode};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputer filling missing values column-by-column.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Impute every column of a DataFrame, returning a new DataFrame.
    ///
    /// The input is never mutated. Row count and column names are preserved.
    /// Columns where at least one cell parses as numeric are coerced to f64
    /// (unparseable text becomes null) and nulls are filled with the mean of
    /// the non-null values. Columns with no numeric cells are filled with
    /// the most frequent value. Columns with no non-null values at all are
    /// left unchanged, since no mean or mode exists to fill them with.
    pub fn impute(df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        for (col_name, kind) in profile_columns(df) {
            match kind {
                ColumnKind::Numeric => Self::impute_numeric(&mut out, &col_name)?,
                ColumnKind::Categorical => Self::impute_categorical(&mut out, &col_name)?,
                ColumnKind::Empty => {
                    debug!("Column '{}' has no usable values, leaving as-is", col_name);
                }
            }
        }

        Ok(out)
    }

    /// Coerce a column to f64 and fill nulls with the column mean.
    fn impute_numeric(df: &mut DataFrame, col_name: &str) -> Result<()> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let coerced = Self::coerce_to_f64(&series)?;

        let filled = match coerced.mean() {
            Some(mean_val) => {
                let null_count = coerced.null_count();
                if null_count > 0 {
                    debug!(
                        "Filling {} missing values in '{}' with mean {:.2}",
                        null_count, col_name, mean_val
                    );
                }
                fill_numeric_nulls(&coerced, mean_val)?
            }
            None => coerced,
        };

        df.replace(col_name, filled)?;
        Ok(())
    }

    /// Fill nulls in a categorical column with the most frequent value.
    fn impute_categorical(df: &mut DataFrame, col_name: &str) -> Result<()> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        if series.null_count() == 0 {
            return Ok(());
        }

        if let Some(mode_val) = string_mode(&series) {
            debug!(
                "Filling {} missing values in '{}' with mode '{}'",
                series.null_count(),
                col_name,
                mode_val
            );
            let filled = fill_string_nulls(&series, &mode_val)?;
            df.replace(col_name, filled)?;
        }

        Ok(())
    }

    /// Coerce a Series to Float64. String cells go through best-effort
    /// numeric parsing; anything unparseable becomes null.
    fn coerce_to_f64(series: &Series) -> PolarsResult<Series> {
        if series.dtype() == &DataType::String {
            let str_chunked = series.str()?;
            let values: Vec<Option<f64>> = str_chunked
                .into_iter()
                .map(|opt_val| opt_val.and_then(|v| parse_numeric_string(v.trim())))
                .collect();
            return Ok(Series::new(series.name().clone(), values));
        }

        series.cast(&DataType::Float64)
    }
}
