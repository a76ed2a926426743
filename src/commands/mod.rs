pub mod general;
pub mod performance;
pub mod stopwords;
pub mod summary;
pub mod trend;

pub use general::run_general;
pub use performance::run_performance;
pub use stopwords::run_stopwords;
pub use summary::run_summary;
pub use trend::run_trend;

use anyhow::{Context, Result};
use log::info;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

use crate::cli::DatabaseArgs;
use techminer::common::write_table_csv;
use techminer::config::{load_config, load_project_config, Config};

/// Load the configuration named on the command line, or the project one, then
/// let explicit flags override it.
pub fn resolve_config(
    config: Option<&Path>,
    root_dir: Option<&PathBuf>,
) -> Result<Config> {
    let mut resolved = match config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => {
            let root = root_dir.cloned().unwrap_or_else(|| PathBuf::from("./"));
            load_project_config(&root).context("Failed to load project config")?
        }
    };

    if let Some(root) = root_dir {
        resolved.database.root_dir = root.clone();
    }
    Ok(resolved)
}

pub fn resolve_database_config(args: &DatabaseArgs) -> Result<Config> {
    let mut config = resolve_config(args.config.as_deref(), args.root_dir.as_ref())?;
    let db = &mut config.database;

    if let Some(database) = args.database {
        db.database = database;
    }
    if let Some(range) = args.year_filter {
        db.year_filter = range;
    }
    if let Some(range) = args.cited_by_filter {
        db.cited_by_filter = range;
    }
    if !args.filters.is_empty() {
        db.filters = args.filters.clone();
    }

    info!("Database: {}", db.database_path().display());
    Ok(config)
}

/// Print a report table and write it as CSV when an output path is given.
pub fn emit_table(df: &mut DataFrame, output: Option<&Path>) -> Result<()> {
    println!("{}", df);

    if let Some(path) = output {
        write_table_csv(df, path)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        info!("Wrote {} rows to {}", df.height(), path.display());
    }
    Ok(())
}
