//! Database sink for bulk-loading the cleaned table.
//!
//! The sink is an external collaborator behind the [`TableSink`] trait,
//! exposing a single replace-table operation. Only compiled with the `db`
//! feature.

mod postgres;
mod sink;

pub use postgres::PostgresSink;
pub use sink::TableSink;
