use log::{info, warn};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::common::Metric;
use crate::error::Result;
use crate::indicators::{
    Aggregator, GrowthCalculator, IndicatorColumn, IndicatorTable, ItemFilter, ItemSelection,
};
use crate::records::{DatabaseParams, RecordReader, RecordSource, YEAR};

pub const DEFAULT_TIME_WINDOW: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceOptions {
    pub field: String,
    pub metric: Metric,
    #[serde(flatten)]
    pub selection: ItemSelection,
    pub time_window: u32,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            field: "author_keywords".to_string(),
            metric: Metric::Occgc,
            selection: ItemSelection::default(),
            time_window: DEFAULT_TIME_WINDOW,
        }
    }
}

impl PerformanceOptions {
    pub fn new<S: Into<String>>(field: S, metric: Metric) -> Self {
        Self {
            field: field.into(),
            metric,
            ..Self::default()
        }
    }
}

/// Columns surfaced for a display metric. The `OCC` view only shows the
/// growth columns when growth was actually computed.
pub fn columns_for(metric: Metric, table: &IndicatorTable) -> Vec<IndicatorColumn> {
    use IndicatorColumn::*;

    let mut columns = match metric {
        Metric::Occgc => vec![
            RankOcc,
            RankGcs,
            RankLcs,
            Occ,
            GlobalCitations,
            LocalCitations,
            HIndex,
            GIndex,
            MIndex,
        ],
        Metric::Occ => vec![RankOcc, Occ, Before, Between, GrowthPercentage],
        Metric::GlobalCitations | Metric::LocalCitations => vec![
            RankGcs,
            RankLcs,
            GlobalCitations,
            LocalCitations,
            GlobalCitationsPerDocument,
            LocalCitationsPerDocument,
            GlobalCitationsPerYear,
        ],
        Metric::HIndex | Metric::GIndex | Metric::MIndex => vec![HIndex, GIndex, MIndex],
    };

    let available = table.available_columns();
    columns.retain(|column| available.contains(column));
    columns
}

#[derive(Debug, Clone)]
pub struct PerformanceReport {
    pub metric: Metric,
    pub table: IndicatorTable,
    pub columns: Vec<IndicatorColumn>,
}

impl PerformanceReport {
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.table.to_dataframe(&self.columns)
    }
}

/// Per-item performance indicators of one field: aggregation, growth, item
/// selection and a metric-specific column view.
#[derive(Debug, Clone)]
pub struct PerformanceMetrics<S = RecordReader> {
    source: S,
    aggregator: Aggregator,
    growth: GrowthCalculator,
    filter: ItemFilter,
}

impl Default for PerformanceMetrics<RecordReader> {
    fn default() -> Self {
        Self::new(RecordReader::new())
    }
}

impl<S: RecordSource> PerformanceMetrics<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            aggregator: Aggregator::default(),
            growth: GrowthCalculator::new(),
            filter: ItemFilter::default(),
        }
    }

    pub fn compute(
        &self,
        params: &DatabaseParams,
        options: &PerformanceOptions,
    ) -> Result<PerformanceReport> {
        let records = self.source.read(params)?;
        let mut table = self.aggregator.aggregate(&records, &options.field)?;

        if records.has_column(YEAR) {
            let by_year = self
                .aggregator
                .items_by_year(&records, &options.field, false)?;
            table = self
                .growth
                .compute_growth(table, &by_year, options.time_window)?;
        } else {
            warn!("No '{}' column; growth indicators skipped", YEAR);
        }

        let table = self.filter.select(table, options.metric, &options.selection)?;
        let columns = columns_for(options.metric, &table);

        info!(
            "Performance metrics for '{}' by {}: {} items",
            options.field,
            options.metric,
            table.len()
        );

        Ok(PerformanceReport {
            metric: options.metric,
            table,
            columns,
        })
    }
}
