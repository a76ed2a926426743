use std::cmp::Ordering;

use super::{IndicatorRow, IndicatorTable};
use crate::common::Metric;

/// Numeric column an indicator table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Occ,
    GlobalCitations,
    LocalCitations,
    HIndex,
    GIndex,
    MIndex,
}

impl SortKey {
    fn value(&self, row: &IndicatorRow) -> Option<f64> {
        match self {
            SortKey::Occ => Some(row.occ as f64),
            SortKey::GlobalCitations => row.global_citations.map(|v| v as f64),
            SortKey::LocalCitations => row.local_citations.map(|v| v as f64),
            SortKey::HIndex => row.h_index.map(f64::from),
            SortKey::GIndex => row.g_index.map(f64::from),
            SortKey::MIndex => row.m_index,
        }
    }
}

/// Descending priority columns for a metric; the item name breaks the
/// remaining ties in ascending order.
pub fn sort_keys(metric: Metric) -> [SortKey; 3] {
    match metric {
        Metric::Occgc | Metric::Occ => [SortKey::Occ, SortKey::GlobalCitations, SortKey::LocalCitations],
        Metric::GlobalCitations => [SortKey::GlobalCitations, SortKey::LocalCitations, SortKey::Occ],
        Metric::LocalCitations => [SortKey::LocalCitations, SortKey::GlobalCitations, SortKey::Occ],
        Metric::HIndex => [SortKey::HIndex, SortKey::GlobalCitations, SortKey::Occ],
        Metric::GIndex => [SortKey::GIndex, SortKey::GlobalCitations, SortKey::Occ],
        Metric::MIndex => [SortKey::MIndex, SortKey::GlobalCitations, SortKey::Occ],
    }
}

// Larger first; missing values go last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorSorter;

impl IndicatorSorter {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(&self, a: &IndicatorRow, b: &IndicatorRow, metric: Metric) -> Ordering {
        sort_keys(metric)
            .iter()
            .map(|key| descending(key.value(a), key.value(b)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.item.cmp(&b.item))
    }

    /// Row positions in metric order, leaving `rows` untouched.
    pub fn order(&self, rows: &[IndicatorRow], metric: Metric) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..rows.len()).collect();
        idx.sort_by(|&i, &j| self.compare(&rows[i], &rows[j], metric));
        idx
    }

    pub fn sort(&self, mut rows: Vec<IndicatorRow>, metric: Metric) -> Vec<IndicatorRow> {
        rows.sort_by(|a, b| self.compare(a, b, metric));
        rows
    }

    pub fn sort_table(&self, mut table: IndicatorTable, metric: Metric) -> IndicatorTable {
        table.rows = self.sort(table.rows, metric);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: &str, occ: u32, gc: i64, lc: i64, h: u32) -> IndicatorRow {
        let mut r = IndicatorRow::new(item, occ).with_citations(gc, lc);
        r.h_index = Some(h);
        r
    }

    fn rows() -> Vec<IndicatorRow> {
        vec![
            row("CRYPTO", 2, 38, 7, 2),
            row("REGTECH", 2, 2, 0, 1),
            row("FINTECH", 4, 23, 6, 3),
            row("BLOCKCHAIN", 2, 40, 6, 2),
        ]
    }

    fn names(rows: &[IndicatorRow]) -> Vec<&str> {
        rows.iter().map(|r| r.item.as_str()).collect()
    }

    #[test]
    fn test_sort_by_occ_breaks_ties_on_citations() {
        let sorted = IndicatorSorter::new().sort(rows(), Metric::Occ);
        assert_eq!(names(&sorted), vec!["FINTECH", "BLOCKCHAIN", "CRYPTO", "REGTECH"]);
    }

    #[test]
    fn test_sort_by_local_citations_falls_back_to_global() {
        let sorted = IndicatorSorter::new().sort(rows(), Metric::LocalCitations);
        assert_eq!(names(&sorted), vec!["CRYPTO", "BLOCKCHAIN", "FINTECH", "REGTECH"]);
    }

    #[test]
    fn test_name_is_final_ascending_tie_break() {
        let tied = vec![row("B", 1, 1, 1, 1), row("C", 1, 1, 1, 1), row("A", 1, 1, 1, 1)];
        let sorted = IndicatorSorter::new().sort(tied, Metric::HIndex);
        assert_eq!(names(&sorted), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let mut data = rows();
        data.push(IndicatorRow::new("NO_CITES", 9));
        let sorted = IndicatorSorter::new().sort(data, Metric::GlobalCitations);
        assert_eq!(sorted.last().unwrap().item, "NO_CITES");
    }

    #[test]
    fn test_sort_is_idempotent() {
        let sorter = IndicatorSorter::new();
        for metric in Metric::ALL {
            let once = sorter.sort(rows(), metric);
            let twice = sorter.sort(once.clone(), metric);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_order_matches_sort() {
        let data = rows();
        let order = IndicatorSorter::new().order(&data, Metric::HIndex);
        let by_order: Vec<&str> = order.iter().map(|&i| data[i].item.as_str()).collect();
        assert_eq!(by_order, vec!["FINTECH", "BLOCKCHAIN", "CRYPTO", "REGTECH"]);
    }
}
