use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use super::{emit_table, resolve_database_config};
use crate::cli::TrendArgs;
use techminer::common::{create_spinner, format_elapsed, setup_logging};
use techminer::metrics::{TrendMetrics, TrendReport};
use techminer::records::RecordReader;

pub fn run_trend(args: TrendArgs) -> Result<TrendReport> {
    let start_time = Instant::now();
    setup_logging(&args.db.log_level)?;

    let mut config = resolve_database_config(&args.db)?;
    if args.columns.is_some() {
        config.trend.selected_columns = args.columns;
    }

    let spinner = create_spinner("Computing trend metrics...");
    let report = TrendMetrics::new(RecordReader::new())
        .compute(&config.database, &config.trend)
        .context("Failed to compute trend metrics");
    spinner.finish_and_clear();
    let report = report?;

    let mut df = report.dataframe().clone();
    emit_table(&mut df, args.output.as_deref())?;

    info!(
        "Trend metrics: {} years in {}",
        df.height(),
        format_elapsed(start_time.elapsed())
    );
    Ok(report)
}
