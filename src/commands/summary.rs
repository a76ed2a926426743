use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use super::{emit_table, resolve_database_config};
use crate::cli::SummaryArgs;
use techminer::common::{create_spinner, format_elapsed, setup_logging};
use techminer::records::RecordReader;
use techminer::tools::{summary_dataframe, ColumnSummary, SummarySheet};

pub fn run_summary(args: SummaryArgs) -> Result<Vec<ColumnSummary>> {
    let start_time = Instant::now();
    setup_logging(&args.db.log_level)?;

    let config = resolve_database_config(&args.db)?;

    let spinner = create_spinner("Summarizing columns...");
    let rows = SummarySheet::new(RecordReader::new())
        .compute(&config.database)
        .context("Failed to build summary sheet");
    spinner.finish_and_clear();
    let rows = rows?;

    let mut df = summary_dataframe(&rows)?;
    emit_table(&mut df, args.output.as_deref())?;

    info!(
        "Summary sheet: {} columns in {}",
        rows.len(),
        format_elapsed(start_time.elapsed())
    );
    Ok(rows)
}
