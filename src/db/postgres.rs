//! PostgreSQL sink implementation.
//!
//! Implements [`TableSink`] over `tokio-postgres`, driven from a
//! current-thread runtime so the calling pipeline stays synchronous. The
//! destination table is dropped and recreated on every run; rows go out as
//! multi-row INSERT statements in bounded chunks.

use super::TableSink;
use crate::error::{PipelineError, Result};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

/// Default number of rows per INSERT statement.
const DEFAULT_CHUNK_SIZE: usize = 1000;

/// PostgreSQL implementation of [`TableSink`].
pub struct PostgresSink {
    runtime: tokio::runtime::Runtime,
    client: tokio_postgres::Client,
    chunk_size: usize,
}

impl PostgresSink {
    /// Connect to the database at `db_url`.
    ///
    /// Fails with [`PipelineError::Connection`] when the database cannot
    /// be reached.
    pub fn connect(db_url: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Connection(e.to_string()))?;

        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(db_url, NoTls))
            .map_err(|e| PipelineError::Connection(e.to_string()))?;

        // The connection task must be polled for queries to make progress;
        // it runs on the same runtime whenever the sink blocks on a query.
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                warn!("Database connection error: {}", e);
            }
        });

        Ok(Self {
            runtime,
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Set the number of rows per INSERT statement.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn execute(&self, sql: &str, table_name: &str) -> Result<u64> {
        self.runtime
            .block_on(self.client.execute(sql, &[]))
            .map_err(|e| PipelineError::Write {
                target: format!("table '{}'", table_name),
                reason: e.to_string(),
            })
    }
}

impl TableSink for PostgresSink {
    fn replace_table(&self, df: &DataFrame, table_name: &str) -> Result<u64> {
        info!(
            "Replacing table '{}' with {} rows in chunks of {}",
            table_name,
            df.height(),
            self.chunk_size
        );

        self.execute(
            &format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)),
            table_name,
        )?;
        self.execute(&create_table_sql(df, table_name), table_name)?;

        let mut written = 0u64;
        let mut offset = 0;
        while offset < df.height() {
            let len = self.chunk_size.min(df.height() - offset);
            let sql = insert_sql(df, table_name, offset, len)?;
            written += self.execute(&sql, table_name)?;
            debug!("Inserted rows {}..{}", offset, offset + len);
            offset += len;
        }

        Ok(written)
    }

    fn name(&self) -> &str {
        "PostgreSQL"
    }
}

/// Quote a SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL string literal, doubling embedded quotes.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Map a polars dtype to the SQL column type used on table creation.
fn sql_column_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Float32 | DataType::Float64 => "DOUBLE PRECISION",
        DataType::Boolean => "BOOLEAN",
        dtype if is_numeric_dtype(dtype) => "BIGINT",
        _ => "TEXT",
    }
}

/// Build the CREATE TABLE statement for a DataFrame's schema.
fn create_table_sql(df: &DataFrame, table_name: &str) -> String {
    let columns: Vec<String> = df
        .get_columns()
        .iter()
        .map(|col| {
            format!(
                "{} {}",
                quote_ident(col.name()),
                sql_column_type(col.dtype())
            )
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        quote_ident(table_name),
        columns.join(", ")
    )
}

/// Render a single cell as a SQL literal.
fn sql_literal(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "NULL".to_string(),
        AnyValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        AnyValue::String(s) => quote_literal(s),
        AnyValue::StringOwned(s) => quote_literal(s),
        AnyValue::Float32(v) if !v.is_finite() => "NULL".to_string(),
        AnyValue::Float64(v) if !v.is_finite() => "NULL".to_string(),
        AnyValue::Float32(v) => v.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        other => {
            if is_numeric_dtype(&other.dtype()) {
                other.to_string()
            } else {
                quote_literal(&other.to_string())
            }
        }
    }
}

/// Build a multi-row INSERT statement for `len` rows starting at `offset`.
fn insert_sql(df: &DataFrame, table_name: &str, offset: usize, len: usize) -> Result<String> {
    let column_list: Vec<String> = df
        .get_columns()
        .iter()
        .map(|col| quote_ident(col.name()))
        .collect();

    let mut rows = Vec::with_capacity(len);
    for i in offset..offset + len {
        let mut cells = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            let value = col.as_materialized_series().get(i)?;
            cells.push(sql_literal(&value));
        }
        rows.push(format!("({})", cells.join(", ")));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table_name),
        column_list.join(", "),
        rows.join(", ")
    ))
}
