//! Column classification for imputation.
//!
//! Decides, per column, which fill policy applies: numeric columns take the
//! mean, categorical columns take the mode, and empty columns are left
//! alone.

use crate::utils::{is_numeric_dtype, is_numeric_string};
use polars::prelude::*;

/// Fill policy classification for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// At least one cell parses as numeric; the column is coerced to f64
    /// and mean-filled.
    Numeric,
    /// No cell parses as numeric; missing cells take the mode.
    Categorical,
    /// No non-null cells at all; nothing to fill with.
    Empty,
}

/// Classify a column for imputation.
///
/// A column counts as numeric when its dtype is already numeric or when any
/// of its string cells parses as a number (after stripping common
/// formatting). Everything else with at least one non-null value is
/// categorical.
pub fn column_kind(series: &Series) -> ColumnKind {
    if series.null_count() == series.len() {
        return ColumnKind::Empty;
    }

    if is_numeric_dtype(series.dtype()) {
        return ColumnKind::Numeric;
    }

    if series.dtype() == &DataType::String {
        if let Ok(str_chunked) = series.str() {
            for val in str_chunked.into_iter().flatten() {
                if is_numeric_string(val.trim()) {
                    return ColumnKind::Numeric;
                }
            }
        }
    }

    ColumnKind::Categorical
}

/// Classify every column of a DataFrame, in column order.
pub fn profile_columns(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    df.get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            (series.name().to_string(), column_kind(series))
        })
        .collect()
}
