use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use super::{emit_table, resolve_database_config};
use crate::cli::PerformanceArgs;
use techminer::common::{create_spinner, format_elapsed, setup_logging};
use techminer::metrics::{PerformanceMetrics, PerformanceReport};
use techminer::records::RecordReader;

pub fn run_performance(args: PerformanceArgs) -> Result<PerformanceReport> {
    let start_time = Instant::now();
    setup_logging(&args.db.log_level)?;

    let config = resolve_database_config(&args.db)?;
    let mut options = config.performance;
    if let Some(field) = args.field {
        options.field = field;
    }
    if let Some(metric) = args.metric {
        options.metric = metric;
    }
    if args.top_n.is_some() {
        options.selection.top_n = args.top_n;
    }
    if let Some(range) = args.occ_range {
        options.selection.occ_range = range;
    }
    if let Some(range) = args.gc_range {
        options.selection.gc_range = range;
    }
    if args.custom_items.is_some() {
        options.selection.custom_items = args.custom_items;
    }
    if let Some(window) = args.time_window {
        options.time_window = window;
    }

    info!("Field: {} | Metric: {}", options.field, options.metric);

    let spinner = create_spinner("Computing performance metrics...");
    let report = PerformanceMetrics::new(RecordReader::new())
        .compute(&config.database, &options)
        .with_context(|| format!("Failed to compute performance metrics for '{}'", options.field));
    spinner.finish_and_clear();
    let report = report?;

    let mut df = report.to_dataframe()?;
    emit_table(&mut df, args.output.as_deref())?;

    info!(
        "Performance metrics: {} items in {}",
        report.table.len(),
        format_elapsed(start_time.elapsed())
    );
    Ok(report)
}
