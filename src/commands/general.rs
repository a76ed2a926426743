use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use super::{emit_table, resolve_database_config};
use crate::cli::GeneralArgs;
use techminer::common::{create_spinner, format_elapsed, setup_logging};
use techminer::metrics::{GeneralMetrics, GeneralReport};
use techminer::records::RecordReader;

pub fn run_general(args: GeneralArgs) -> Result<GeneralReport> {
    let start_time = Instant::now();
    setup_logging(&args.db.log_level)?;

    let mut config = resolve_database_config(&args.db)?;
    if args.current_year.is_some() {
        config.general.current_year = args.current_year;
    }

    let spinner = create_spinner("Computing general metrics...");
    let report = GeneralMetrics::new(RecordReader::new())
        .compute(&config.database, &config.general)
        .context("Failed to compute general metrics");
    spinner.finish_and_clear();
    let report = report?;

    let mut df = report.to_dataframe()?;
    emit_table(&mut df, args.output.as_deref())?;

    info!(
        "General metrics: {} statistics in {}",
        report.stats.len(),
        format_elapsed(start_time.elapsed())
    );
    Ok(report)
}
