//! Error taxonomy for loading, reshaping, and summarizing indicator tables.
//!
//! `NotFound`, `Parse`, and `Schema` are fatal for the operation that raised
//! them; `InsufficientData` is reported per series and does not abort a
//! batched [`crate::stats::describe_all`] run.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Input source missing or unreadable.
    #[error("cannot open {path}: {source}")]
    NotFound { path: String, source: io::Error },

    /// Malformed header or inconsistent row width. The whole load is
    /// rejected, never partially accepted.
    #[error("malformed table: {0}")]
    Parse(String),

    /// A requested identifier or indicator column is not present in the
    /// loaded header. An already-loaded table stays valid; the caller may
    /// retry with a corrected name.
    #[error("column or key {name:?} not present in the table")]
    Schema { name: String },

    /// Fewer than 2 non-missing values: standard deviation, skewness, and
    /// kurtosis are undefined below that threshold.
    #[error("series {series:?} has {count} non-missing value(s); at least 2 required")]
    InsufficientData { series: String, count: usize },
}
