pub mod aggregate;
pub mod filter;
pub mod growth;
pub mod sort;

pub use aggregate::*;
pub use filter::*;
pub use growth::*;
pub use sort::*;

use polars::prelude::*;
use std::collections::HashSet;

use crate::error::{Result, TechminerError};

/// Growth statistics of one item over the trailing time window.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthStats {
    /// Occurrences before the window.
    pub before: u32,
    /// Occurrences inside the window.
    pub between: u32,
    pub growth_percentage: f64,
    pub average_growth_rate: f64,
    pub average_docs_per_year: f64,
    /// `average_docs_per_year / OCC`. The name is historical: this is not a
    /// share of the last year.
    pub percentage_docs_last_year: f64,
}

/// Years `[year_start, year_end]` growth was measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthWindow {
    pub year_start: i64,
    pub year_end: i64,
}

impl GrowthWindow {
    pub fn before_column(&self) -> String {
        format!("before_{}", self.year_start)
    }

    pub fn between_column(&self) -> String {
        format!("between_{}_{}", self.year_start, self.year_end)
    }
}

/// Aggregated statistics for one distinct value of the grouping field.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub item: String,
    pub rank_occ: u32,
    pub rank_gcs: u32,
    pub rank_lcs: u32,
    pub occ: u32,
    pub global_citations: Option<i64>,
    pub local_citations: Option<i64>,
    pub first_year: Option<i64>,
    pub global_citations_per_document: Option<f64>,
    pub local_citations_per_document: Option<f64>,
    pub global_citations_per_year: Option<f64>,
    pub h_index: Option<u32>,
    pub g_index: Option<u32>,
    pub m_index: Option<f64>,
    pub growth: Option<GrowthStats>,
}

impl IndicatorRow {
    /// A row with only the item and its occurrence count filled in.
    pub fn new<S: Into<String>>(item: S, occ: u32) -> Self {
        Self {
            item: item.into(),
            rank_occ: 0,
            rank_gcs: 0,
            rank_lcs: 0,
            occ,
            global_citations: None,
            local_citations: None,
            first_year: None,
            global_citations_per_document: None,
            local_citations_per_document: None,
            global_citations_per_year: None,
            h_index: None,
            g_index: None,
            m_index: None,
            growth: None,
        }
    }

    pub fn with_citations(mut self, global: i64, local: i64) -> Self {
        self.global_citations = Some(global);
        self.local_citations = Some(local);
        self
    }
}

/// Every column an indicator table can surface, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorColumn {
    RankOcc,
    RankGcs,
    RankLcs,
    Occ,
    Before,
    Between,
    GrowthPercentage,
    GlobalCitations,
    LocalCitations,
    GlobalCitationsPerDocument,
    LocalCitationsPerDocument,
    GlobalCitationsPerYear,
    HIndex,
    GIndex,
    MIndex,
    AverageGrowthRate,
    AverageDocsPerYear,
    PercentageDocsLastYear,
}

impl IndicatorColumn {
    /// Output name; the window-dependent columns need the growth window.
    pub fn name(&self, window: Option<&GrowthWindow>) -> Option<String> {
        let fixed = match self {
            IndicatorColumn::RankOcc => "rank_occ",
            IndicatorColumn::RankGcs => "rank_gcs",
            IndicatorColumn::RankLcs => "rank_lcs",
            IndicatorColumn::Occ => "OCC",
            IndicatorColumn::Before => return window.map(GrowthWindow::before_column),
            IndicatorColumn::Between => return window.map(GrowthWindow::between_column),
            IndicatorColumn::GrowthPercentage => "growth_percentage",
            IndicatorColumn::GlobalCitations => "global_citations",
            IndicatorColumn::LocalCitations => "local_citations",
            IndicatorColumn::GlobalCitationsPerDocument => "global_citations_per_document",
            IndicatorColumn::LocalCitationsPerDocument => "local_citations_per_document",
            IndicatorColumn::GlobalCitationsPerYear => "global_citations_per_year",
            IndicatorColumn::HIndex => "h_index",
            IndicatorColumn::GIndex => "g_index",
            IndicatorColumn::MIndex => "m_index",
            IndicatorColumn::AverageGrowthRate => "average_growth_rate",
            IndicatorColumn::AverageDocsPerYear => "average_docs_per_year",
            IndicatorColumn::PercentageDocsLastYear => "percentage_docs_last_year",
        };
        Some(fixed.to_string())
    }
}

const BASE_COLUMNS: [IndicatorColumn; 12] = [
    IndicatorColumn::RankOcc,
    IndicatorColumn::RankGcs,
    IndicatorColumn::RankLcs,
    IndicatorColumn::Occ,
    IndicatorColumn::GlobalCitations,
    IndicatorColumn::LocalCitations,
    IndicatorColumn::GlobalCitationsPerDocument,
    IndicatorColumn::LocalCitationsPerDocument,
    IndicatorColumn::GlobalCitationsPerYear,
    IndicatorColumn::HIndex,
    IndicatorColumn::GIndex,
    IndicatorColumn::MIndex,
];

const GROWTH_COLUMNS: [IndicatorColumn; 6] = [
    IndicatorColumn::Before,
    IndicatorColumn::Between,
    IndicatorColumn::GrowthPercentage,
    IndicatorColumn::AverageGrowthRate,
    IndicatorColumn::AverageDocsPerYear,
    IndicatorColumn::PercentageDocsLastYear,
];

/// Indicator rows for one grouping field. Item names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    pub field: String,
    pub rows: Vec<IndicatorRow>,
    pub growth_window: Option<GrowthWindow>,
}

impl IndicatorTable {
    pub fn new<S: Into<String>>(field: S, rows: Vec<IndicatorRow>) -> Self {
        Self {
            field: field.into(),
            rows,
            growth_window: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn items(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.item.as_str()).collect()
    }

    pub fn get(&self, item: &str) -> Option<&IndicatorRow> {
        self.rows.iter().find(|row| row.item == item)
    }

    /// Keep only the named items, preserving the current row order.
    pub fn retain_items<S: AsRef<str>>(mut self, items: &[S]) -> Self {
        let keep: HashSet<&str> = items.iter().map(|s| s.as_ref()).collect();
        self.rows.retain(|row| keep.contains(row.item.as_str()));
        self
    }

    /// All columns with data in this table.
    pub fn available_columns(&self) -> Vec<IndicatorColumn> {
        let mut columns = BASE_COLUMNS.to_vec();
        if self.growth_window.is_some() {
            columns.extend(GROWTH_COLUMNS);
        }
        columns
    }

    /// Build a frame whose first column holds the items (named after the
    /// grouping field) followed by `columns`, selected by name.
    pub fn to_dataframe(&self, columns: &[IndicatorColumn]) -> Result<DataFrame> {
        let mut out = Vec::with_capacity(columns.len() + 1);
        out.push(Column::new(
            self.field.as_str().into(),
            self.rows.iter().map(|r| r.item.as_str()).collect::<Vec<_>>(),
        ));

        for column in columns {
            let name = column
                .name(self.growth_window.as_ref())
                .ok_or_else(|| {
                    TechminerError::InvalidArgument(format!(
                        "column {:?} needs growth indicators, which were not computed",
                        column
                    ))
                })?;
            out.push(self.build_column(*column, name));
        }

        Ok(DataFrame::new(out)?)
    }

    fn build_column(&self, column: IndicatorColumn, name: String) -> Column {
        let rows = &self.rows;
        let growth = |f: fn(&GrowthStats) -> f64| -> Vec<Option<f64>> {
            rows.iter().map(|r| r.growth.as_ref().map(f)).collect()
        };
        let name: PlSmallStr = name.into();

        match column {
            IndicatorColumn::RankOcc => {
                Column::new(name, rows.iter().map(|r| r.rank_occ).collect::<Vec<_>>())
            }
            IndicatorColumn::RankGcs => {
                Column::new(name, rows.iter().map(|r| r.rank_gcs).collect::<Vec<_>>())
            }
            IndicatorColumn::RankLcs => {
                Column::new(name, rows.iter().map(|r| r.rank_lcs).collect::<Vec<_>>())
            }
            IndicatorColumn::Occ => Column::new(name, rows.iter().map(|r| r.occ).collect::<Vec<_>>()),
            IndicatorColumn::Before => Column::new(
                name,
                rows.iter()
                    .map(|r| r.growth.as_ref().map(|g| g.before))
                    .collect::<Vec<_>>(),
            ),
            IndicatorColumn::Between => Column::new(
                name,
                rows.iter()
                    .map(|r| r.growth.as_ref().map(|g| g.between))
                    .collect::<Vec<_>>(),
            ),
            IndicatorColumn::GrowthPercentage => Column::new(name, growth(|g| g.growth_percentage)),
            IndicatorColumn::AverageGrowthRate => Column::new(name, growth(|g| g.average_growth_rate)),
            IndicatorColumn::AverageDocsPerYear => {
                Column::new(name, growth(|g| g.average_docs_per_year))
            }
            IndicatorColumn::PercentageDocsLastYear => {
                Column::new(name, growth(|g| g.percentage_docs_last_year))
            }
            IndicatorColumn::GlobalCitations => Column::new(
                name,
                rows.iter().map(|r| r.global_citations).collect::<Vec<_>>(),
            ),
            IndicatorColumn::LocalCitations => Column::new(
                name,
                rows.iter().map(|r| r.local_citations).collect::<Vec<_>>(),
            ),
            IndicatorColumn::GlobalCitationsPerDocument => Column::new(
                name,
                rows.iter()
                    .map(|r| r.global_citations_per_document)
                    .collect::<Vec<_>>(),
            ),
            IndicatorColumn::LocalCitationsPerDocument => Column::new(
                name,
                rows.iter()
                    .map(|r| r.local_citations_per_document)
                    .collect::<Vec<_>>(),
            ),
            IndicatorColumn::GlobalCitationsPerYear => Column::new(
                name,
                rows.iter()
                    .map(|r| r.global_citations_per_year)
                    .collect::<Vec<_>>(),
            ),
            IndicatorColumn::HIndex => {
                Column::new(name, rows.iter().map(|r| r.h_index).collect::<Vec<_>>())
            }
            IndicatorColumn::GIndex => {
                Column::new(name, rows.iter().map(|r| r.g_index).collect::<Vec<_>>())
            }
            IndicatorColumn::MIndex => {
                Column::new(name, rows.iter().map(|r| r.m_index).collect::<Vec<_>>())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IndicatorTable {
        let mut a = IndicatorRow::new("A", 3).with_citations(10, 1);
        a.h_index = Some(2);
        let b = IndicatorRow::new("B", 1);
        IndicatorTable::new("author_keywords", vec![a, b])
    }

    #[test]
    fn test_to_dataframe_named_columns() {
        let df = table()
            .to_dataframe(&[IndicatorColumn::Occ, IndicatorColumn::GlobalCitations, IndicatorColumn::HIndex])
            .unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["author_keywords", "OCC", "global_citations", "h_index"]);
        assert_eq!(df.column("global_citations").unwrap().null_count(), 1);
    }

    #[test]
    fn test_growth_columns_need_window() {
        let result = table().to_dataframe(&[IndicatorColumn::Before]);
        assert!(matches!(result, Err(TechminerError::InvalidArgument(_))));

        let mut with_window = table();
        with_window.growth_window = Some(GrowthWindow { year_start: 2018, year_end: 2019 });
        let df = with_window
            .to_dataframe(&[IndicatorColumn::Before, IndicatorColumn::Between])
            .unwrap();
        assert!(df.column("before_2018").is_ok());
        assert!(df.column("between_2018_2019").is_ok());
    }

    #[test]
    fn test_retain_items_keeps_order() {
        let kept = table().retain_items(&["B", "A", "Z"]);
        assert_eq!(kept.items(), vec!["A", "B"]);
    }
}
