use log::{debug, info};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};

use super::{IndicatorRow, IndicatorSorter, IndicatorTable, ItemsByYear};
use crate::common::{round2, Metric};
use crate::error::{Result, TechminerError};
use crate::records::{RecordSet, GLOBAL_CITATIONS, LOCAL_CITATIONS, YEAR};

const OCC: &str = "OCC";
const FIRST_YEAR: &str = "first_year";
const CITATIONS: &str = "citations";

/// Largest `h` such that `h` of the records have at least `h` citations.
pub fn h_index(citations: &[i64]) -> u32 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|&(i, &c)| c > i as i64)
        .count() as u32
}

/// Largest `g` such that the `g` most cited records hold at least `g²` citations.
pub fn g_index(citations: &[i64]) -> u32 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut total = 0i64;
    let mut g = 0u32;
    for (i, c) in sorted.iter().enumerate() {
        total += (*c).max(0);
        let rank = i as i64 + 1;
        if total >= rank * rank {
            g = rank as u32;
        }
    }
    g
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().collect())
}

/// Groups records by the values of a multi-valued field and computes the
/// per-item occurrence and citation indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    sorter: IndicatorSorter,
}

impl Aggregator {
    pub fn new(sorter: IndicatorSorter) -> Self {
        Self { sorter }
    }

    pub fn aggregate(&self, records: &RecordSet, field: &str) -> Result<IndicatorTable> {
        if !records.has_column(field) {
            return Err(TechminerError::MissingColumn(field.to_string()));
        }

        let has_year = records.has_column(YEAR);
        let has_gc = records.has_column(GLOBAL_CITATIONS);
        let has_lc = records.has_column(LOCAL_CITATIONS);

        // Absent columns are stood in for by zeros and masked back to None below.
        let present_or_zero = |name: &str, present: bool| {
            if present {
                col(name)
            } else {
                lit(0i64).alias(name)
            }
        };

        let grouped = records
            .exploded(
                field,
                vec![
                    present_or_zero(YEAR, has_year),
                    present_or_zero(GLOBAL_CITATIONS, has_gc),
                    present_or_zero(LOCAL_CITATIONS, has_lc),
                ],
            )
            .group_by_stable([col(field)])
            .agg([
                len().alias(OCC),
                col(GLOBAL_CITATIONS).sum().alias(GLOBAL_CITATIONS),
                col(LOCAL_CITATIONS).sum().alias(LOCAL_CITATIONS),
                col(YEAR).min().alias(FIRST_YEAR),
                col(GLOBAL_CITATIONS).fill_null(lit(0i64)).alias(CITATIONS),
            ])
            .collect()?;

        let last_year = if has_year {
            records.year_span()?.map(|(_, last)| last)
        } else {
            None
        };

        let item_column = grouped.column(field)?.cast(&DataType::String)?;
        let items = item_column.str()?;
        let occ = int_column(&grouped, OCC)?;
        let gc_sums = int_column(&grouped, GLOBAL_CITATIONS)?;
        let lc_sums = int_column(&grouped, LOCAL_CITATIONS)?;
        let first_years = int_column(&grouped, FIRST_YEAR)?;
        let citations = grouped.column(CITATIONS)?.list()?;

        let mut rows = Vec::with_capacity(grouped.height());
        for i in 0..grouped.height() {
            let item = match items.get(i) {
                Some(item) => item,
                None => continue,
            };

            let cites: Vec<i64> = match citations.get_as_series(i) {
                Some(series) => {
                    let series = series.cast(&DataType::Int64)?;
                    let values = series.i64()?;
                    values.into_iter().map(|v| v.unwrap_or(0)).collect()
                }
                None => Vec::new(),
            };

            let count = occ[i].unwrap_or(0).max(0) as u32;
            let mut row = IndicatorRow::new(item, count);

            if has_gc {
                row.global_citations = Some(gc_sums[i].unwrap_or(0));
                row.h_index = Some(h_index(&cites));
                row.g_index = Some(g_index(&cites));
            }
            if has_lc {
                row.local_citations = Some(lc_sums[i].unwrap_or(0));
            }
            if has_year {
                row.first_year = first_years[i];
            }

            let years_active = match (row.first_year, last_year) {
                (Some(first), Some(last)) => Some((last - first).max(1)),
                _ => None,
            };

            if count > 0 {
                row.global_citations_per_document =
                    row.global_citations.map(|gc| round2(gc as f64 / count as f64));
                row.local_citations_per_document =
                    row.local_citations.map(|lc| round2(lc as f64 / count as f64));
            }
            row.global_citations_per_year = row
                .global_citations
                .zip(years_active)
                .map(|(gc, years)| round2(gc as f64 / years as f64));
            row.m_index = row
                .h_index
                .zip(years_active)
                .map(|(h, years)| round2(h as f64 / years as f64));

            rows.push(row);
        }

        self.assign_ranks(&mut rows);
        let rows = self.sorter.sort(rows, Metric::Occ);

        info!("Aggregated {} distinct items of '{}'", rows.len(), field);
        Ok(IndicatorTable::new(field, rows))
    }

    fn assign_ranks(&self, rows: &mut [IndicatorRow]) {
        let by_occ = self.sorter.order(rows, Metric::Occ);
        let by_gcs = self.sorter.order(rows, Metric::GlobalCitations);
        let by_lcs = self.sorter.order(rows, Metric::LocalCitations);

        for (rank, idx) in by_occ.into_iter().enumerate() {
            rows[idx].rank_occ = rank as u32 + 1;
        }
        for (rank, idx) in by_gcs.into_iter().enumerate() {
            rows[idx].rank_gcs = rank as u32 + 1;
        }
        for (rank, idx) in by_lcs.into_iter().enumerate() {
            rows[idx].rank_lcs = rank as u32 + 1;
        }
    }

    /// Occurrences of every item per year over the contiguous range of years
    /// in which the field has values.
    pub fn items_by_year(
        &self,
        records: &RecordSet,
        field: &str,
        cumulative: bool,
    ) -> Result<ItemsByYear> {
        for name in [field, YEAR] {
            if !records.has_column(name) {
                return Err(TechminerError::MissingColumn(name.to_string()));
            }
        }

        let grouped = records
            .exploded(field, vec![col(YEAR)])
            .filter(col(YEAR).is_not_null())
            .group_by_stable([col(field), col(YEAR)])
            .agg([len().alias(OCC)])
            .collect()?;

        let item_column = grouped.column(field)?.cast(&DataType::String)?;
        let items = item_column.str()?;
        let years = int_column(&grouped, YEAR)?;
        let counts = int_column(&grouped, OCC)?;

        let mut per_item: HashMap<String, BTreeMap<i64, u32>> = HashMap::new();
        for i in 0..grouped.height() {
            if let (Some(item), Some(year)) = (items.get(i), years[i]) {
                let count = counts[i].unwrap_or(0).max(0) as u32;
                *per_item
                    .entry(item.to_string())
                    .or_default()
                    .entry(year)
                    .or_insert(0) += count;
            }
        }

        let table = ItemsByYear::from_counts(per_item);
        debug!(
            "Items by year for '{}': {} items over {:?}",
            field,
            table.len(),
            table.year_bounds()
        );

        Ok(if cumulative { table.cumulative() } else { table })
    }
}
