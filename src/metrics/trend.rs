use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TechminerError};
use crate::records::{
    DatabaseParams, RecordReader, RecordSet, RecordSource, GLOBAL_CITATIONS, LOCAL_CITATIONS, YEAR,
};

const OCC: &str = "OCC";
const CUM_OCC: &str = "cum_OCC";
const CITABLE_YEARS: &str = "citable_years";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendOptions {
    /// Restrict the output to these columns; `year` is always kept.
    pub selected_columns: Option<Vec<String>>,
}

/// `mean_*`, `cum_*` and `mean_*_per_year` columns for one citation count.
fn citation_trend(name: &str) -> [Expr; 3] {
    let mean = format!("mean_{}", name);
    [
        (col(name).cast(DataType::Float64) / col(OCC).cast(DataType::Float64)).alias(mean.as_str()),
        col(name).cum_sum(false).alias(format!("cum_{}", name)),
        (col(name).cast(DataType::Float64)
            / col(OCC).cast(DataType::Float64)
            / col(CITABLE_YEARS).cast(DataType::Float64))
        .round(2)
        .alias(format!("{}_per_year", mean)),
    ]
}

/// Year-by-year publication and citation counts of a record set.
pub fn yearly_trend(records: &RecordSet) -> Result<DataFrame> {
    if !records.has_column(YEAR) {
        return Err(TechminerError::MissingColumn(YEAR.to_string()));
    }
    // Without any dated record no row survives the null filter.
    let last_year = records.year_span()?.map_or(0, |(_, last)| last);

    let has_gc = records.has_column(GLOBAL_CITATIONS);
    let has_lc = records.has_column(LOCAL_CITATIONS);

    let mut aggs = vec![len().cast(DataType::Int64).alias(OCC)];
    let mut order = vec![col(YEAR), col(OCC), col(CUM_OCC)];
    if has_lc {
        aggs.push(col(LOCAL_CITATIONS).fill_null(lit(0i64)).sum());
        order.push(col(LOCAL_CITATIONS));
    }
    if has_gc {
        aggs.push(col(GLOBAL_CITATIONS).fill_null(lit(0i64)).sum());
        order.push(col(GLOBAL_CITATIONS));
    }
    order.push(col(CITABLE_YEARS));

    let mut lf = records
        .dataframe()
        .clone()
        .lazy()
        .filter(col(YEAR).is_not_null())
        .group_by([col(YEAR)])
        .agg(aggs)
        .sort([YEAR], SortMultipleOptions::default())
        .with_columns([
            col(OCC).cum_sum(false).alias(CUM_OCC),
            (lit(last_year) - col(YEAR) + lit(1i64)).alias(CITABLE_YEARS),
        ]);

    for (present, name) in [(has_gc, GLOBAL_CITATIONS), (has_lc, LOCAL_CITATIONS)] {
        if present {
            lf = lf.with_columns(citation_trend(name));
            order.extend([
                col(format!("mean_{}", name)),
                col(format!("cum_{}", name)),
                col(format!("mean_{}_per_year", name)),
            ]);
        }
    }

    Ok(lf.select(order).collect()?)
}

#[derive(Debug, Clone)]
pub struct TrendReport {
    df: DataFrame,
}

impl TrendReport {
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn years(&self) -> Result<Vec<i64>> {
        Ok(self.df.column(YEAR)?.i64()?.into_iter().flatten().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendMetrics<S = RecordReader> {
    source: S,
}

impl<S: RecordSource> TrendMetrics<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn compute(&self, params: &DatabaseParams, options: &TrendOptions) -> Result<TrendReport> {
        let records = self.source.read(params)?;
        let mut df = yearly_trend(&records)?;

        if let Some(selected) = &options.selected_columns {
            let available: Vec<String> = df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();

            let mut keep = vec![YEAR.to_string()];
            for name in selected {
                if !available.contains(name) {
                    return Err(TechminerError::InvalidArgument(format!(
                        "unknown trend column '{}' (available: {})",
                        name,
                        available.join(", ")
                    )));
                }
                if !keep.contains(name) {
                    keep.push(name.clone());
                }
            }
            df = df.select(keep)?;
        }

        info!("Trend metrics over {} years", df.height());
        Ok(TrendReport { df })
    }
}
