use std::io;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by record loading, indicator computation and report building.
#[derive(Debug, Error)]
pub enum TechminerError {
    /// Unknown database name, or a database/stopword/config file that does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed argument: range with the wrong arity, zero time window, unknown column.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unrecognized metric '{0}'")]
    InvalidMetric(String),
    /// A hard dependency on a column that the record set does not carry.
    #[error("column '{0}' is not present in the record set")]
    MissingColumn(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TechminerError>;
