pub mod reader;

pub use reader::*;

use log::debug;
use polars::prelude::*;

use crate::common::{split_items, FieldFilter, RangeFilter};
use crate::error::{Result, TechminerError};

pub const ARTICLE: &str = "article";
pub const YEAR: &str = "year";
pub const GLOBAL_CITATIONS: &str = "global_citations";
pub const LOCAL_CITATIONS: &str = "local_citations";
pub const NUM_AUTHORS: &str = "num_authors";

const INTEGER_COLUMNS: [&str; 4] = [YEAR, GLOBAL_CITATIONS, LOCAL_CITATIONS, NUM_AUTHORS];

/// Immutable set of bibliographic records, one row per `article`.
///
/// Every filter consumes the set and returns a new one; the source file is
/// never touched.
#[derive(Debug, Clone)]
pub struct RecordSet {
    df: DataFrame,
}

impl RecordSet {
    /// Wrap a frame, normalizing the numeric record columns to `Int64`.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let casts: Vec<Expr> = INTEGER_COLUMNS
            .iter()
            .filter(|name| df.get_column_index(name).is_some())
            .map(|name| col(*name).cast(DataType::Int64))
            .collect();

        let df = if casts.is_empty() {
            df
        } else {
            df.lazy().with_columns(casts).collect()?
        };

        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Integer values of a column, or `None` when the column is absent.
    pub fn int_values(&self, name: &str) -> Result<Option<Vec<Option<i64>>>> {
        if !self.has_column(name) {
            return Ok(None);
        }
        let casted = self.df.column(name)?.cast(&DataType::Int64)?;
        Ok(Some(casted.i64()?.into_iter().collect()))
    }

    /// String values of a column, or `None` when the column is absent.
    pub fn str_values(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        if !self.has_column(name) {
            return Ok(None);
        }
        let casted = self.df.column(name)?.cast(&DataType::String)?;
        Ok(Some(
            casted
                .str()?
                .into_iter()
                .map(|v| v.map(String::from))
                .collect(),
        ))
    }

    /// Per-record split of a `;`-delimited field. Null cells stay `None`.
    pub fn split_values(&self, name: &str) -> Result<Option<Vec<Option<Vec<String>>>>> {
        Ok(self.str_values(name)?.map(|values| {
            values
                .into_iter()
                .map(|v| v.map(|s| split_items(&s)))
                .collect()
        }))
    }

    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.df.column(name)?.null_count())
    }

    /// First and last publication year, if any record carries one.
    pub fn year_span(&self) -> Result<Option<(i64, i64)>> {
        let years = match self.int_values(YEAR)? {
            Some(years) => years,
            None => return Ok(None),
        };
        let mut iter = years.into_iter().flatten();
        let first = match iter.next() {
            Some(year) => year,
            None => return Ok(None),
        };
        Ok(Some(iter.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)))))
    }

    /// Drop exact duplicate rows, keeping the first occurrence in file order.
    pub fn deduplicate(self) -> Result<Self> {
        let before = self.len();
        let df = self
            .df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        debug!("Deduplicated records: {} -> {}", before, df.height());
        Ok(Self { df })
    }

    /// Inclusive range filter on an integer column. An unbounded range is a
    /// pass-through and does not require the column to exist.
    pub fn filter_by_range(self, column: &str, range: RangeFilter) -> Result<Self> {
        let lower = range.min.map(|min| col(column).gt_eq(lit(min)));
        let upper = range.max.map(|max| col(column).lt_eq(lit(max)));

        let predicate = match (lower, upper) {
            (None, None) => return Ok(self),
            (Some(lo), None) => lo,
            (None, Some(hi)) => hi,
            (Some(lo), Some(hi)) => lo.and(hi),
        };

        if !self.has_column(column) {
            return Err(TechminerError::MissingColumn(column.to_string()));
        }

        let df = self.df.lazy().filter(predicate).collect()?;
        debug!("Filtered records by {} in {}: {} remain", column, range, df.height());
        Ok(Self { df })
    }

    pub fn filter_by_year(self, range: RangeFilter) -> Result<Self> {
        self.filter_by_range(YEAR, range)
    }

    pub fn filter_by_citations(self, range: RangeFilter) -> Result<Self> {
        self.filter_by_range(GLOBAL_CITATIONS, range)
    }

    /// Split a multi-valued field on `;`, one whitespace-trimmed value per
    /// row. `extra` columns ride along with every exploded value.
    pub fn exploded(&self, field: &str, extra: Vec<Expr>) -> LazyFrame {
        let mut exprs = vec![col(field)
            .cast(DataType::String)
            .str()
            .split(lit(";"))
            .alias(field)];
        exprs.extend(extra);

        self.df
            .clone()
            .lazy()
            .select(exprs)
            .explode([col(field)])
            .with_column(col(field).str().strip_chars(lit(Null {})))
            .filter(col(field).is_not_null().and(col(field).neq(lit(""))))
    }

    /// Keep the records whose exploded `filter.field` values intersect
    /// `filter.values`. Matching is resolved through the `article` key.
    pub fn filter_by_field(self, filter: &FieldFilter) -> Result<Self> {
        for name in [filter.field.as_str(), ARTICLE] {
            if !self.has_column(name) {
                return Err(TechminerError::MissingColumn(name.to_string()));
            }
        }

        let wanted = Series::new("wanted".into(), &filter.values);
        let matched = self
            .exploded(&filter.field, vec![col(ARTICLE)])
            .filter(col(filter.field.as_str()).is_in(lit(wanted)))
            .select([col(ARTICLE)])
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        let articles = matched.column(ARTICLE)?.as_materialized_series().clone();

        let df = self
            .df
            .lazy()
            .filter(col(ARTICLE).is_in(lit(articles)))
            .collect()?;
        debug!(
            "Filtered records by {} ({} values): {} remain",
            filter.field,
            filter.values.len(),
            df.height()
        );
        Ok(Self { df })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Six records over 2015-2019 used across the indicator and report tests.
    pub fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("article".into(), &["A1", "A2", "A3", "A4", "A5", "A6"]),
            Column::new("year".into(), &[2015i64, 2016, 2017, 2018, 2019, 2019]),
            Column::new("global_citations".into(), &[10i64, 5, 30, 0, 8, 2]),
            Column::new("local_citations".into(), &[2i64, 1, 4, 0, 3, 0]),
            Column::new("num_authors".into(), &[2i64, 1, 3, 1, 2, 1]),
            Column::new(
                "authors".into(),
                &[
                    "Smith J; Lee K",
                    "Smith J",
                    "Chen L; Wang Y; Smith J",
                    "Brown T",
                    "Lee K; Brown T",
                    "Chen L",
                ],
            ),
            Column::new(
                "countries".into(),
                &["USA; Korea", "USA", "China", "UK", "Korea; UK", "China"],
            ),
            Column::new(
                "author_keywords".into(),
                &[
                    "FINTECH; BLOCKCHAIN",
                    "FINTECH",
                    "BLOCKCHAIN; CRYPTO",
                    "FINTECH; REGTECH",
                    "FINTECH; CRYPTO",
                    "REGTECH",
                ],
            ),
            Column::new(
                "document_type".into(),
                &["Article", "Article", "Review", "Article", "Conference paper", "Article"],
            ),
            Column::new(
                "source_title".into(),
                &["J Fin", "J Fin", "Fin Innov", "Fin Innov", "J Econ", "J Fin"],
            ),
            Column::new(
                "global_references".into(),
                &[Some("r1; r2"), Some("r1"), Some("r3;r4;r5"), None, Some("r2"), Some("r6")],
            ),
        ])
        .unwrap()
    }

    pub fn sample_records() -> RecordSet {
        RecordSet::from_dataframe(sample_frame()).unwrap()
    }
}
