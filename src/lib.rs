//! Bibliometric and tech-mining indicators over gzipped CSV record databases.
//!
//! Records are loaded and filtered by [`records::RecordReader`], grouped into
//! per-item indicators by [`indicators::Aggregator`], and composed into the
//! reports in [`metrics`] and [`tools`].

pub mod common;
pub mod config;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod records;
pub mod stopwords;
pub mod tools;

pub use error::{Result, TechminerError};
