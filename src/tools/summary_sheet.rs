use log::info;
use polars::prelude::*;

use crate::common::round2;
use crate::error::Result;
use crate::records::{DatabaseParams, RecordReader, RecordSet, RecordSource};

/// Coverage of one record column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub terms: usize,
    pub coverage: f64,
}

/// Summarize every column of a record set, alphabetically.
pub fn summarize(records: &RecordSet) -> Result<Vec<ColumnSummary>> {
    let documents = records.len();
    let mut columns = records.column_names();
    columns.sort();

    columns
        .into_iter()
        .map(|column| {
            let terms = documents - records.null_count(&column)?;
            let coverage = if documents == 0 {
                0.0
            } else {
                round2(100.0 * terms as f64 / documents as f64)
            };
            Ok(ColumnSummary {
                column,
                terms,
                coverage,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SummarySheet<S = RecordReader> {
    source: S,
}

impl<S: RecordSource> SummarySheet<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn compute(&self, params: &DatabaseParams) -> Result<Vec<ColumnSummary>> {
        let records = self.source.read(params)?;
        let rows = summarize(&records)?;
        info!("Summary sheet: {} columns over {} records", rows.len(), records.len());
        Ok(rows)
    }
}

/// `column`, `number of terms`, `coverage (%)` table.
pub fn summary_dataframe(rows: &[ColumnSummary]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Column::new(
            "column".into(),
            rows.iter().map(|r| r.column.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "number of terms".into(),
            rows.iter().map(|r| r.terms as u64).collect::<Vec<_>>(),
        ),
        Column::new(
            "coverage (%)".into(),
            rows.iter().map(|r| r.coverage).collect::<Vec<_>>(),
        ),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::sample_records;

    #[test]
    fn test_summary_is_alphabetical_with_coverage() {
        let rows = SummarySheet::new(sample_records())
            .compute(&DatabaseParams::default())
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.column.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "article");

        let refs = rows.iter().find(|r| r.column == "global_references").unwrap();
        assert_eq!(refs.terms, 5);
        assert_eq!(refs.coverage, 83.33);

        let year = rows.iter().find(|r| r.column == "year").unwrap();
        assert_eq!(year.coverage, 100.0);
    }

    #[test]
    fn test_summary_dataframe() {
        let rows = summarize(&sample_records()).unwrap();
        let df = summary_dataframe(&rows).unwrap();
        assert_eq!(df.height(), 11);
        assert!(df.column("coverage (%)").is_ok());
    }
}
