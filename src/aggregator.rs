//! Grouped summary statistics and CSV export.
//!
//! Partitions the cleaned table by each candidate grouping column that is
//! present, computes per-group row counts (and the mean of the price column
//! when one exists), and writes one summary file per grouping column plus
//! the full cleaned table.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Aggregator producing per-group summaries of a cleaned table.
pub struct Aggregator;

impl Aggregator {
    /// Summarize the table by every configured grouping column that is
    /// present, writing `summary_by_<column>.csv` per grouping column and
    /// `cleaned_data.csv` to the output directory.
    ///
    /// Creates the output directory (including parents) if absent and
    /// overwrites existing files. Returns the summary table per grouping
    /// column for in-process inspection; the files are the durable output.
    pub fn aggregate(
        df: &DataFrame,
        config: &PipelineConfig,
    ) -> Result<BTreeMap<String, DataFrame>> {
        let output_dir = &config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| PipelineError::Write {
            target: output_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let price_col = column_names
            .iter()
            .any(|c| c == &config.price_column)
            .then_some(config.price_column.as_str());

        let mut results = BTreeMap::new();

        for group_col in &config.group_columns {
            if !column_names.iter().any(|c| c == group_col) {
                debug!("Grouping column '{}' not in dataset, skipping", group_col);
                continue;
            }

            let mut summary = Self::summarize_by(df, group_col, price_col)?;
            let path = output_dir.join(format!("summary_by_{}.csv", group_col));
            Self::write_csv(&mut summary, &path)?;
            info!("Wrote {} ({} groups)", path.display(), summary.height());

            results.insert(group_col.clone(), summary);
        }

        let cleaned_path = output_dir.join("cleaned_data.csv");
        let mut cleaned = df.clone();
        Self::write_csv(&mut cleaned, &cleaned_path)?;
        info!("Wrote {}", cleaned_path.display());

        Ok(results)
    }

    /// Build the summary table for a single grouping column.
    ///
    /// Columns are the grouping column itself, `<groupcol>_count`, and
    /// `<pricecol>_mean` when a price column is given. Rows are sorted in
    /// descending order by the count column; tied groups keep their
    /// first-encounter order. Rows whose grouping value is missing are not
    /// assigned to any group.
    pub fn summarize_by(
        df: &DataFrame,
        group_col: &str,
        price_col: Option<&str>,
    ) -> Result<DataFrame> {
        let group_series = df
            .column(group_col)
            .map_err(|_| PipelineError::ColumnNotFound(group_col.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let keys = group_series.str()?;

        let price_series = match price_col {
            Some(col) => Some(
                df.column(col)
                    .map_err(|_| PipelineError::ColumnNotFound(col.to_string()))?
                    .as_materialized_series()
                    .cast(&DataType::Float64)?,
            ),
            None => None,
        };
        let prices = price_series.as_ref().map(|s| s.f64()).transpose()?;

        // Accumulate counts and price sums per group, in first-encounter order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, (u32, f64, u32)> = HashMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            let Some(key) = key else { continue };
            let entry = groups.entry(key.to_string()).or_insert_with(|| {
                order.push(key.to_string());
                (0, 0.0, 0)
            });
            entry.0 += 1;
            if let Some(prices) = prices {
                if let Some(price) = prices.get(i) {
                    entry.1 += price;
                    entry.2 += 1;
                }
            }
        }

        let mut rows: Vec<(String, u32, Option<f64>)> = order
            .into_iter()
            .map(|key| {
                let (count, sum, price_n) = groups[&key];
                let mean = (price_n > 0).then(|| sum / price_n as f64);
                (key, count, mean)
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));

        let labels: Vec<String> = rows.iter().map(|(key, _, _)| key.clone()).collect();
        let counts: Vec<u32> = rows.iter().map(|(_, count, _)| *count).collect();

        let mut columns = vec![
            Column::new(group_col.into(), labels),
            Column::new(format!("{}_count", group_col).into(), counts),
        ];
        if let Some(col) = price_col {
            let means: Vec<Option<f64>> = rows.iter().map(|(_, _, mean)| *mean).collect();
            columns.push(Column::new(format!("{}_mean", col).into(), means));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Write a DataFrame as CSV with a header row and no index column.
    fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| PipelineError::Write {
            target: path.display().to_string(),
            reason: e.to_string(),
        })?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)
            .map_err(|e| PipelineError::Write {
                target: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}
