use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{IndicatorRow, IndicatorSorter, IndicatorTable};
use crate::common::{Metric, RangeFilter};
use crate::error::Result;

/// How the reported items are chosen from the full indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSelection {
    pub top_n: Option<usize>,
    pub occ_range: RangeFilter,
    pub gc_range: RangeFilter,
    /// When set, exactly these items are reported and everything else is ignored.
    pub custom_items: Option<Vec<String>>,
}

impl Default for ItemSelection {
    fn default() -> Self {
        Self {
            top_n: None,
            occ_range: RangeFilter::UNBOUNDED,
            gc_range: RangeFilter::UNBOUNDED,
            custom_items: None,
        }
    }
}

impl ItemSelection {
    pub fn top(top_n: usize) -> Self {
        Self {
            top_n: Some(top_n),
            ..Self::default()
        }
    }

    pub fn custom<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            custom_items: Some(items.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFilter {
    sorter: IndicatorSorter,
}

impl ItemFilter {
    pub fn new(sorter: IndicatorSorter) -> Self {
        Self { sorter }
    }

    /// Items inside both ranges, ranked by `metric`, truncated to `top_n`.
    pub fn generate_custom_items(
        &self,
        rows: &[IndicatorRow],
        metric: Metric,
        top_n: Option<usize>,
        occ_range: RangeFilter,
        gc_range: RangeFilter,
    ) -> Vec<String> {
        let candidates: Vec<IndicatorRow> = rows
            .iter()
            .filter(|row| gc_range.contains_opt(row.global_citations))
            .filter(|row| occ_range.contains(row.occ as i64))
            .cloned()
            .collect();

        let ranked = self.sorter.sort(candidates, metric);
        let limit = top_n.unwrap_or(ranked.len());

        ranked.into_iter().take(limit).map(|row| row.item).collect()
    }

    /// Items reported for `metric`. `OCCGC` takes the `OCC` ranking and
    /// appends whatever the `global_citations` ranking adds, so the result can
    /// hold up to twice `top_n` items.
    pub fn selected_items(
        &self,
        rows: &[IndicatorRow],
        metric: Metric,
        selection: &ItemSelection,
    ) -> Vec<String> {
        if let Some(custom) = &selection.custom_items {
            return custom.clone();
        }

        let generate = |metric| {
            self.generate_custom_items(
                rows,
                metric,
                selection.top_n,
                selection.occ_range,
                selection.gc_range,
            )
        };

        if metric != Metric::Occgc {
            return generate(metric);
        }

        let mut items = generate(Metric::Occ);
        let mut seen: HashSet<String> = items.iter().cloned().collect();
        for item in generate(Metric::GlobalCitations) {
            if seen.insert(item.clone()) {
                items.push(item);
            }
        }
        items
    }

    /// Restrict `table` to the selected items, sorted by `metric`.
    pub fn select(
        &self,
        table: IndicatorTable,
        metric: Metric,
        selection: &ItemSelection,
    ) -> Result<IndicatorTable> {
        let items = self.selected_items(&table.rows, metric, selection);
        let before = table.len();

        let table = self.sorter.sort_table(table.retain_items(&items), metric);
        debug!(
            "Selected {} of {} items by {}",
            table.len(),
            before,
            metric
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Aggregator;
    use crate::records::fixtures::sample_records;

    fn table() -> IndicatorTable {
        Aggregator::default()
            .aggregate(&sample_records(), "author_keywords")
            .unwrap()
    }

    #[test]
    fn test_top_n_by_metric() {
        let filter = ItemFilter::default();
        let selected = filter
            .select(table(), Metric::GlobalCitations, &ItemSelection::top(2))
            .unwrap();
        assert_eq!(selected.items(), vec!["BLOCKCHAIN", "CRYPTO"]);
    }

    #[test]
    fn test_occgc_unions_both_rankings() {
        let filter = ItemFilter::default();

        let one = filter.select(table(), Metric::Occgc, &ItemSelection::top(1)).unwrap();
        assert_eq!(one.items(), vec!["FINTECH", "BLOCKCHAIN"]);

        let two = filter.select(table(), Metric::Occgc, &ItemSelection::top(2)).unwrap();
        assert_eq!(two.items(), vec!["FINTECH", "BLOCKCHAIN", "CRYPTO"]);
        assert!(two.len() <= 4);
    }

    #[test]
    fn test_ranges_apply_before_top_n() {
        let selection = ItemSelection {
            top_n: None,
            occ_range: RangeFilter::new(Some(2), None),
            gc_range: RangeFilter::new(None, Some(30)),
            custom_items: None,
        };
        let selected = ItemFilter::default()
            .select(table(), Metric::Occ, &selection)
            .unwrap();
        assert_eq!(selected.items(), vec!["FINTECH", "REGTECH"]);
    }

    #[test]
    fn test_unbounded_ranges_are_pass_through() {
        let selected = ItemFilter::default()
            .select(table(), Metric::Occ, &ItemSelection::default())
            .unwrap();
        assert_eq!(selected, table());
    }

    #[test]
    fn test_custom_items_ignore_ranges() {
        let selection = ItemSelection {
            top_n: Some(1),
            occ_range: RangeFilter::new(Some(100), None),
            ..ItemSelection::custom(["REGTECH", "CRYPTO"])
        };
        let selected = ItemFilter::default()
            .select(table(), Metric::HIndex, &selection)
            .unwrap();
        assert_eq!(selected.items(), vec!["CRYPTO", "REGTECH"]);
    }

    #[test]
    fn test_selection_from_json() {
        let selection: ItemSelection =
            serde_json::from_str(r#"{"top_n": 5, "gc_range": [10, null]}"#).unwrap();
        assert_eq!(selection.top_n, Some(5));
        assert_eq!(selection.gc_range, RangeFilter::new(Some(10), None));
        assert!(selection.occ_range.is_unbounded());
    }
}
