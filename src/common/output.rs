use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

use crate::error::Result;

/// Write a report table as CSV, creating parent directories as needed.
pub fn write_table_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}
