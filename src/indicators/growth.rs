use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

use super::{GrowthStats, GrowthWindow, IndicatorTable};
use crate::common::round2;
use crate::error::{Result, TechminerError};

/// Yearly occurrence counts per item over a contiguous range of years.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemsByYear {
    pub years: Vec<i64>,
    counts: HashMap<String, Vec<u32>>,
    cumulative: bool,
}

impl ItemsByYear {
    /// Spread sparse `(item, year) -> count` pairs over every year between the
    /// first and last observed one, filling gaps with zeros.
    pub fn from_counts(per_item: HashMap<String, BTreeMap<i64, u32>>) -> Self {
        let first = per_item.values().filter_map(|m| m.keys().next()).min().copied();
        let last = per_item.values().filter_map(|m| m.keys().next_back()).max().copied();

        let years: Vec<i64> = match (first, last) {
            (Some(first), Some(last)) => (first..=last).collect(),
            _ => return Self::default(),
        };

        let counts = per_item
            .into_iter()
            .map(|(item, by_year)| {
                let row = years
                    .iter()
                    .map(|year| by_year.get(year).copied().unwrap_or(0))
                    .collect();
                (item, row)
            })
            .collect();

        Self {
            years,
            counts,
            cumulative: false,
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn is_cumulative(&self) -> bool {
        self.cumulative
    }

    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    pub fn counts(&self, item: &str) -> Option<&[u32]> {
        self.counts.get(item).map(Vec::as_slice)
    }

    /// Running totals along the year axis.
    pub fn cumulative(mut self) -> Self {
        if self.cumulative {
            return self;
        }
        for row in self.counts.values_mut() {
            let mut total = 0;
            for value in row.iter_mut() {
                total += *value;
                *value = total;
            }
        }
        self.cumulative = true;
        self
    }
}

/// Attaches growth statistics over a trailing window of years.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthCalculator;

impl GrowthCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the growth columns for every row of `table`.
    ///
    /// When the data spans no more years than the window, the table comes back
    /// unchanged and without a growth window.
    pub fn compute_growth(
        &self,
        mut table: IndicatorTable,
        by_year: &ItemsByYear,
        time_window: u32,
    ) -> Result<IndicatorTable> {
        if time_window == 0 {
            return Err(TechminerError::InvalidArgument(
                "time window must be at least one year".to_string(),
            ));
        }
        if by_year.is_cumulative() {
            return Err(TechminerError::InvalidArgument(
                "growth needs per-year counts, not cumulative ones".to_string(),
            ));
        }

        let (first_year, last_year) = match by_year.year_bounds() {
            Some(bounds) => bounds,
            None => return Ok(table),
        };

        let window = time_window as i64;
        if last_year - first_year <= window {
            warn!(
                "Years {}-{} do not exceed a {}-year window; growth skipped",
                first_year, last_year, time_window
            );
            return Ok(table);
        }

        let year_start = last_year - window + 1;
        let start_idx = (year_start - first_year) as usize;

        for row in table.rows.iter_mut() {
            let counts = match by_year.counts(&row.item) {
                Some(counts) => counts,
                None => continue,
            };

            let total: u32 = counts.iter().sum();
            let between: u32 = counts[start_idx..].iter().sum();
            let before = total.saturating_sub(between);

            // Year-over-year differences from the year preceding the window.
            let diffs: i64 = counts[start_idx - 1..]
                .windows(2)
                .map(|pair| pair[1] as i64 - pair[0] as i64)
                .sum();

            let average_docs_per_year = between as f64 / time_window as f64;
            let occ = row.occ as f64;

            row.growth = Some(GrowthStats {
                before,
                between,
                growth_percentage: if occ > 0.0 {
                    round2(100.0 * between as f64 / occ)
                } else {
                    0.0
                },
                average_growth_rate: diffs as f64 / time_window as f64,
                average_docs_per_year,
                percentage_docs_last_year: if occ > 0.0 {
                    average_docs_per_year / occ
                } else {
                    0.0
                },
            });
        }

        let growth_window = GrowthWindow {
            year_start,
            year_end: last_year,
        };
        debug!(
            "Growth computed for {} items over {}-{}",
            table.len(),
            growth_window.year_start,
            growth_window.year_end
        );
        table.growth_window = Some(growth_window);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Aggregator;
    use crate::records::fixtures::sample_records;

    fn inputs() -> (IndicatorTable, ItemsByYear) {
        let aggregator = Aggregator::default();
        let records = sample_records();
        let table = aggregator.aggregate(&records, "author_keywords").unwrap();
        let by_year = aggregator
            .items_by_year(&records, "author_keywords", false)
            .unwrap();
        (table, by_year)
    }

    #[test]
    fn test_from_counts_fills_gaps() {
        let mut per_item = HashMap::new();
        per_item.insert("A".to_string(), BTreeMap::from([(2010, 2), (2013, 1)]));
        per_item.insert("B".to_string(), BTreeMap::from([(2011, 4)]));

        let table = ItemsByYear::from_counts(per_item);
        assert_eq!(table.years, vec![2010, 2011, 2012, 2013]);
        assert_eq!(table.counts("A").unwrap(), &[2, 0, 0, 1]);
        assert_eq!(table.counts("B").unwrap(), &[0, 4, 0, 0]);
        assert!(ItemsByYear::from_counts(HashMap::new()).is_empty());
    }

    #[test]
    fn test_growth_two_year_window() {
        let (table, by_year) = inputs();
        let table = GrowthCalculator::new().compute_growth(table, &by_year, 2).unwrap();

        assert_eq!(
            table.growth_window,
            Some(GrowthWindow { year_start: 2018, year_end: 2019 })
        );

        let stats = |item: &str| table.get(item).unwrap().growth.clone().unwrap();

        let fintech = stats("FINTECH");
        assert_eq!((fintech.before, fintech.between), (2, 2));
        assert_eq!(fintech.growth_percentage, 50.0);
        assert_eq!(fintech.average_growth_rate, 0.5);
        assert_eq!(fintech.average_docs_per_year, 1.0);
        assert_eq!(fintech.percentage_docs_last_year, 0.25);

        let blockchain = stats("BLOCKCHAIN");
        assert_eq!((blockchain.before, blockchain.between), (2, 0));
        assert_eq!(blockchain.growth_percentage, 0.0);
        assert_eq!(blockchain.average_growth_rate, -0.5);

        let regtech = stats("REGTECH");
        assert_eq!((regtech.before, regtech.between), (0, 2));
        assert_eq!(regtech.growth_percentage, 100.0);
        assert_eq!(regtech.percentage_docs_last_year, 0.5);
    }

    #[test]
    fn test_before_and_between_sum_to_occ() {
        let (table, by_year) = inputs();
        let table = GrowthCalculator::new().compute_growth(table, &by_year, 3).unwrap();

        let window = table.growth_window.unwrap();
        assert_eq!(window.before_column(), "before_2017");
        assert_eq!(window.between_column(), "between_2017_2019");

        for row in &table.rows {
            let growth = row.growth.as_ref().unwrap();
            assert_eq!(growth.before + growth.between, row.occ);
        }
    }

    #[test]
    fn test_window_covering_all_years_is_noop() {
        let (table, by_year) = inputs();
        let original = table.clone();
        let table = GrowthCalculator::new().compute_growth(table, &by_year, 4).unwrap();
        assert_eq!(table, original);
        assert!(table.growth_window.is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        let (table, by_year) = inputs();
        let calculator = GrowthCalculator::new();
        assert!(matches!(
            calculator.compute_growth(table.clone(), &by_year, 0),
            Err(TechminerError::InvalidArgument(_))
        ));
        assert!(matches!(
            calculator.compute_growth(table, &by_year.cumulative(), 2),
            Err(TechminerError::InvalidArgument(_))
        ));
    }
}
