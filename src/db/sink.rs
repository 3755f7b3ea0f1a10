//! Sink trait for abstracting the relational store.
//!
//! This module defines the [`TableSink`] trait so the pipeline can
//! bulk-write its cleaned table without knowing which store backs it.
//! [`super::PostgresSink`] is the shipped implementation; a test double
//! only needs this one method.

use crate::error::Result;
use polars::prelude::DataFrame;

/// Trait for relational stores that can receive the cleaned table.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
pub trait TableSink: Send + Sync {
    /// Bulk-write all rows of `df` to `table_name`, REPLACING the table if
    /// it already exists. Destructive: no merge, no append, no schema
    /// migration. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PipelineError::Connection`] when the store
    /// is unreachable and [`crate::error::PipelineError::Write`] on any
    /// write fault. A failure partway through may leave the destination
    /// table partially populated; nothing is rolled back here.
    fn replace_table(&self, df: &DataFrame, table_name: &str) -> Result<u64>;

    /// Sink name for logging and debugging.
    fn name(&self) -> &str;
}
