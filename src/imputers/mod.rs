//! Imputation module for handling missing values.
//!
//! Missing cells are filled column-by-column: numeric columns with the
//! mean, categorical columns with the mode.

mod statistical;

pub use statistical::StatisticalImputer;
