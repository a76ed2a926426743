use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::{current_year, round2};
use crate::error::Result;
use crate::records::{
    DatabaseParams, RecordReader, RecordSet, RecordSource, GLOBAL_CITATIONS, NUM_AUTHORS, YEAR,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl StatValue {
    fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            StatValue::Missing
        } else {
            StatValue::Float(round2(numerator / denominator))
        }
    }

    fn from_opt(value: Option<f64>) -> Self {
        value.map_or(StatValue::Missing, |v| StatValue::Float(round2(v)))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, StatValue::Missing)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(v) => write!(f, "{}", v),
            StatValue::Float(v) => write!(f, "{}", v),
            StatValue::Text(v) => f.write_str(v),
            StatValue::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub category: &'static str,
    pub item: String,
    pub value: StatValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralOptions {
    /// Reference year for document ages; the system clock when unset.
    pub current_year: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GeneralReport {
    pub stats: Vec<Stat>,
}

impl GeneralReport {
    pub fn get(&self, category: &str, item: &str) -> Option<&StatValue> {
        self.stats
            .iter()
            .find(|s| s.category == category && s.item == item)
            .map(|s| &s.value)
    }

    pub fn category(&self, category: &str) -> Vec<&Stat> {
        self.stats.iter().filter(|s| s.category == category).collect()
    }

    /// `category`, `item`, `value` columns; missing values become nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let categories: Vec<&str> = self.stats.iter().map(|s| s.category).collect();
        let items: Vec<&str> = self.stats.iter().map(|s| s.item.as_str()).collect();
        let values: Vec<Option<String>> = self
            .stats
            .iter()
            .map(|s| (!s.value.is_missing()).then(|| s.value.to_string()))
            .collect();

        Ok(DataFrame::new(vec![
            Column::new("category".into(), categories),
            Column::new("item".into(), items),
            Column::new("value".into(), values),
        ])?)
    }
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
    }
}

const DOCUMENT_TYPE: &str = "document_type";
const SOURCE_TITLE: &str = "source_title";
const AUTHORS: &str = "authors";

/// Evaluate a single aggregate expression to an integer.
fn scalar_count(lf: LazyFrame, expr: Expr) -> Result<i64> {
    let df = lf.select([expr.cast(DataType::Int64).alias("count")]).collect()?;
    Ok(df.column("count")?.i64()?.get(0).unwrap_or(0))
}

/// Distinct trimmed values of a multi-valued field; 0 when the field is absent.
fn count_unique(records: &RecordSet, field: &str) -> Result<i64> {
    if !records.has_column(field) {
        return Ok(0);
    }
    scalar_count(records.exploded(field, vec![]), col(field).n_unique())
}

struct StatsBuilder<'a> {
    records: &'a RecordSet,
    current_year: i64,
    stats: Vec<Stat>,
}

impl<'a> StatsBuilder<'a> {
    fn insert(&mut self, category: &'static str, item: &str, value: StatValue) {
        self.stats.push(Stat {
            category,
            item: item.to_string(),
            value,
        });
    }

    fn insert_unique(&mut self, category: &'static str, item: &str, field: &str) -> Result<()> {
        let count = count_unique(self.records, field)?;
        self.insert(category, item, StatValue::Int(count));
        Ok(())
    }

    fn general(&mut self) -> Result<()> {
        let records = self.records;
        let n_docs = records.len() as i64;
        let years: Vec<i64> = records
            .int_values(YEAR)?
            .map(|v| v.into_iter().flatten().collect())
            .unwrap_or_default();
        let span = records.year_span()?;

        self.insert(
            "GENERAL",
            "Timespan",
            span.map_or(StatValue::Missing, |(lo, hi)| {
                StatValue::Text(format!("{}:{}", lo, hi))
            }),
        );
        self.insert("GENERAL", "Documents", StatValue::Int(n_docs));

        let growth_rate = span.and_then(|(first, last)| {
            let p0 = years.iter().filter(|&&y| y == first).count() as f64;
            let n_years = (last - first + 1) as f64;
            (p0 > 0.0).then(|| 100.0 * ((n_docs as f64 / p0).powf(1.0 / n_years) - 1.0))
        });
        self.insert("GENERAL", "Annual growth rate %", StatValue::from_opt(growth_rate));

        let average_age = mean(&years).map(|m| self.current_year as f64 - m);
        self.insert("GENERAL", "Document average age", StatValue::from_opt(average_age));

        match records.split_values("global_references")? {
            Some(refs) => {
                let per_doc: Vec<i64> = refs.into_iter().flatten().map(|r| r.len() as i64).collect();
                self.insert(
                    "GENERAL",
                    "Num References",
                    StatValue::Int(per_doc.iter().sum()),
                );
                self.insert(
                    "GENERAL",
                    "Average references per document",
                    StatValue::from_opt(mean(&per_doc)),
                );
            }
            None => {
                self.insert("GENERAL", "Num References", StatValue::Missing);
                self.insert("GENERAL", "Average references per document", StatValue::Missing);
            }
        }

        let citations: Option<Vec<i64>> = records
            .int_values(GLOBAL_CITATIONS)?
            .map(|v| v.into_iter().flatten().collect());
        let avg_citations = citations.as_deref().and_then(mean);
        self.insert(
            "GENERAL",
            "Average citations per document",
            StatValue::from_opt(avg_citations),
        );
        let per_year = avg_citations
            .zip(span)
            .map(|(avg, (lo, hi))| avg / (hi - lo + 1) as f64);
        self.insert(
            "GENERAL",
            "Average citations per document per year",
            StatValue::from_opt(per_year),
        );

        if records.has_column(SOURCE_TITLE) {
            let lf = records.dataframe().clone().lazy();
            let titles = scalar_count(lf.clone(), col(SOURCE_TITLE).count())?;
            let distinct = scalar_count(lf, col(SOURCE_TITLE).drop_nulls().n_unique())?;
            self.insert("GENERAL", "Sources", StatValue::Int(distinct));
            self.insert(
                "GENERAL",
                "Average documents per source",
                StatValue::ratio(titles as f64, distinct as f64),
            );
        } else {
            self.insert("GENERAL", "Sources", StatValue::Missing);
            self.insert("GENERAL", "Average documents per source", StatValue::Missing);
        }
        Ok(())
    }

    fn document_types(&mut self) -> Result<()> {
        if !self.records.has_column(DOCUMENT_TYPE) {
            return Ok(());
        }
        let counts = self
            .records
            .dataframe()
            .clone()
            .lazy()
            .select([col(DOCUMENT_TYPE).cast(DataType::String)])
            .filter(col(DOCUMENT_TYPE).is_not_null())
            .group_by([col(DOCUMENT_TYPE)])
            .agg([len().cast(DataType::Int64).alias("count")])
            .sort([DOCUMENT_TYPE], SortMultipleOptions::default())
            .collect()?;

        let types = counts.column(DOCUMENT_TYPE)?.str()?;
        let totals = counts.column("count")?.i64()?;
        for (doc_type, count) in types.into_iter().zip(totals.into_iter()) {
            if let (Some(doc_type), Some(count)) = (doc_type, count) {
                self.insert("DOCUMENT TYPES", doc_type, StatValue::Int(count));
            }
        }
        Ok(())
    }

    fn authors(&mut self) -> Result<()> {
        let records = self.records;
        self.insert_unique("AUTHORS", "Authors", AUTHORS)?;

        let num_authors = records.int_values(NUM_AUTHORS)?;
        let has_author_counts = records.has_column(NUM_AUTHORS) && records.has_column(AUTHORS);

        if has_author_counts {
            let single_authors = scalar_count(
                records
                    .dataframe()
                    .clone()
                    .lazy()
                    .filter(col(NUM_AUTHORS).eq(lit(1i64))),
                col(AUTHORS).drop_nulls().n_unique(),
            )?;
            self.insert(
                "AUTHORS",
                "Authors of single-authored documents",
                StatValue::Int(single_authors),
            );
        } else {
            self.insert("AUTHORS", "Authors of single-authored documents", StatValue::Missing);
        }

        match &num_authors {
            Some(counts) => {
                let counts: Vec<i64> = counts.iter().flatten().copied().collect();
                let multi: Vec<i64> = counts.iter().copied().filter(|&n| n > 1).collect();
                let single = counts.iter().filter(|&&n| n == 1).count() as i64;

                self.insert("AUTHORS", "Single-authored documents", StatValue::Int(single));
                self.insert(
                    "AUTHORS",
                    "Multi-authored documents",
                    StatValue::Int(multi.len() as i64),
                );
                self.insert("AUTHORS", "Authors per document", StatValue::from_opt(mean(&counts)));
                self.insert("AUTHORS", "Co-authors per document", StatValue::from_opt(mean(&multi)));
            }
            None => {
                for item in [
                    "Single-authored documents",
                    "Multi-authored documents",
                    "Authors per document",
                    "Co-authors per document",
                ] {
                    self.insert("AUTHORS", item, StatValue::Missing);
                }
            }
        }

        let international = records.split_values("countries")?.map(|countries| {
            let per_doc: Vec<usize> = countries.into_iter().flatten().map(|c| c.len()).collect();
            let multi = per_doc.iter().filter(|&&n| n > 1).count();
            StatValue::ratio(100.0 * multi as f64, per_doc.len() as f64)
        });
        self.insert(
            "AUTHORS",
            "International co-authorship %",
            international.unwrap_or(StatValue::Missing),
        );

        match records.split_values(AUTHORS)? {
            Some(per_doc) => {
                let with_authors: Vec<&Vec<String>> = per_doc.iter().flatten().collect();
                let appearances: usize = with_authors.iter().map(|a| a.len()).sum();
                self.insert("AUTHORS", "Author appearances", StatValue::Int(appearances as i64));
                self.insert(
                    "AUTHORS",
                    "Documents per author",
                    StatValue::ratio(with_authors.len() as f64, appearances as f64),
                );
            }
            None => {
                self.insert("AUTHORS", "Author appearances", StatValue::Missing);
                self.insert("AUTHORS", "Documents per author", StatValue::Missing);
            }
        }

        // Multi-authored document count over itself: 1.0 whenever one exists.
        let collaboration = if has_author_counts {
            let multi = scalar_count(
                records.dataframe().clone().lazy().filter(
                    col(NUM_AUTHORS)
                        .gt(lit(1i64))
                        .and(col(AUTHORS).is_not_null()),
                ),
                len(),
            )?;
            StatValue::ratio(multi as f64, multi as f64)
        } else {
            StatValue::Missing
        };
        self.insert("AUTHORS", "Collaboration index", collaboration);

        self.insert_unique("AUTHORS", "Organizations", "organizations")?;
        self.insert_unique("AUTHORS", "Organizations (1st author)", "organization_1st_author")?;
        self.insert_unique("AUTHORS", "Countries", "countries")?;
        self.insert_unique("AUTHORS", "Countries (1st author)", "country_1st_author")?;
        Ok(())
    }

    fn vocabulary(&mut self) -> Result<()> {
        const UNIQUE_COUNTS: [(&str, &str, &str); 14] = [
            ("KEYWORDS", "Raw author keywords", "raw_author_keywords"),
            ("KEYWORDS", "Cleaned author keywords", "author_keywords"),
            ("KEYWORDS", "Raw index keywords", "raw_index_keywords"),
            ("KEYWORDS", "Cleaned index keywords", "index_keywords"),
            ("KEYWORDS", "Raw keywords", "raw_keywords"),
            ("KEYWORDS", "Cleaned keywords", "keywords"),
            ("NLP PHRASES", "Raw title NLP phrases", "raw_title_nlp_phrases"),
            ("NLP PHRASES", "Cleaned title NLP phrases", "title_nlp_phrases"),
            ("NLP PHRASES", "Raw abstract NLP phrases", "raw_abstract_nlp_phrases"),
            ("NLP PHRASES", "Cleaned abstract NLP phrases", "abstract_nlp_phrases"),
            ("NLP PHRASES", "Raw NLP phrases", "raw_nlp_phrases"),
            ("NLP PHRASES", "Cleaned NLP phrases", "nlp_phrases"),
            ("DESCRIPTORS", "Raw descriptors", "raw_descriptors"),
            ("DESCRIPTORS", "Cleaned descriptors", "descriptors"),
        ];

        for (category, item, field) in UNIQUE_COUNTS {
            self.insert_unique(category, item, field)?;
        }
        Ok(())
    }
}

/// Descriptive statistics of a record set, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct GeneralMetrics<S = RecordReader> {
    source: S,
}

impl<S: RecordSource> GeneralMetrics<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn compute(&self, params: &DatabaseParams, options: &GeneralOptions) -> Result<GeneralReport> {
        let records = self.source.read(params)?;
        let mut builder = StatsBuilder {
            records: &records,
            current_year: options.current_year.unwrap_or_else(current_year),
            stats: Vec::new(),
        };

        builder.general()?;
        builder.document_types()?;
        builder.authors()?;
        builder.vocabulary()?;

        info!("General metrics: {} statistics", builder.stats.len());
        Ok(GeneralReport {
            stats: builder.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::{sample_frame, sample_records};

    fn report() -> GeneralReport {
        let options = GeneralOptions {
            current_year: Some(2024),
        };
        GeneralMetrics::new(sample_records())
            .compute(&DatabaseParams::default(), &options)
            .unwrap()
    }

    #[test]
    fn test_general_information() {
        let report = report();
        assert_eq!(
            report.get("GENERAL", "Timespan"),
            Some(&StatValue::Text("2015:2019".to_string()))
        );
        assert_eq!(report.get("GENERAL", "Documents"), Some(&StatValue::Int(6)));
        assert_eq!(
            report.get("GENERAL", "Annual growth rate %"),
            Some(&StatValue::Float(43.1))
        );
        assert_eq!(
            report.get("GENERAL", "Document average age"),
            Some(&StatValue::Float(6.67))
        );
        assert_eq!(report.get("GENERAL", "Num References"), Some(&StatValue::Int(8)));
        assert_eq!(
            report.get("GENERAL", "Average references per document"),
            Some(&StatValue::Float(1.6))
        );
        assert_eq!(
            report.get("GENERAL", "Average citations per document"),
            Some(&StatValue::Float(9.17))
        );
        assert_eq!(report.get("GENERAL", "Sources"), Some(&StatValue::Int(3)));
        assert_eq!(
            report.get("GENERAL", "Average documents per source"),
            Some(&StatValue::Float(2.0))
        );
    }

    #[test]
    fn test_document_types_alphabetical() {
        let report = report();
        let types: Vec<(&str, &StatValue)> = report
            .category("DOCUMENT TYPES")
            .into_iter()
            .map(|s| (s.item.as_str(), &s.value))
            .collect();
        assert_eq!(
            types,
            vec![
                ("Article", &StatValue::Int(4)),
                ("Conference paper", &StatValue::Int(1)),
                ("Review", &StatValue::Int(1)),
            ]
        );
    }

    #[test]
    fn test_author_statistics() {
        let report = report();
        let get = |item: &str| report.get("AUTHORS", item).cloned().unwrap();

        assert_eq!(get("Authors"), StatValue::Int(5));
        assert_eq!(get("Authors of single-authored documents"), StatValue::Int(3));
        assert_eq!(get("Single-authored documents"), StatValue::Int(3));
        assert_eq!(get("Multi-authored documents"), StatValue::Int(3));
        assert_eq!(get("Authors per document"), StatValue::Float(1.67));
        assert_eq!(get("Co-authors per document"), StatValue::Float(2.33));
        assert_eq!(get("International co-authorship %"), StatValue::Float(33.33));
        assert_eq!(get("Author appearances"), StatValue::Int(10));
        assert_eq!(get("Documents per author"), StatValue::Float(0.6));
        assert_eq!(get("Collaboration index"), StatValue::Float(1.0));
        assert_eq!(get("Countries"), StatValue::Int(4));
        assert_eq!(get("Organizations"), StatValue::Int(0));
    }

    #[test]
    fn test_absent_columns_degrade_softly() {
        let frame = sample_frame()
            .drop("global_references")
            .unwrap()
            .drop("source_title")
            .unwrap();
        let records = RecordSet::from_dataframe(frame).unwrap();
        let report = GeneralMetrics::new(records)
            .compute(&DatabaseParams::default(), &GeneralOptions::default())
            .unwrap();

        assert!(report.get("GENERAL", "Num References").unwrap().is_missing());
        assert!(report.get("GENERAL", "Sources").unwrap().is_missing());
        assert_eq!(
            report.get("KEYWORDS", "Cleaned author keywords"),
            Some(&StatValue::Int(4))
        );
        assert_eq!(report.get("DESCRIPTORS", "Raw descriptors"), Some(&StatValue::Int(0)));
    }

    #[test]
    fn test_vocabulary_counts_trim_all_whitespace() {
        let frame = DataFrame::new(vec![
            Column::new("article".into(), &["B1", "B2"]),
            Column::new("num_authors".into(), &[1i64, 1]),
            Column::new("authors".into(), &["Smith J", "Smith J"]),
            Column::new("author_keywords".into(), &["FINTECH;\tBLOCKCHAIN", "BLOCKCHAIN ;"]),
            Column::new("document_type".into(), &[Some("Review"), None]),
        ])
        .unwrap();
        let report = GeneralMetrics::new(RecordSet::from_dataframe(frame).unwrap())
            .compute(&DatabaseParams::default(), &GeneralOptions::default())
            .unwrap();

        assert_eq!(
            report.get("KEYWORDS", "Cleaned author keywords"),
            Some(&StatValue::Int(2))
        );
        assert_eq!(report.category("DOCUMENT TYPES").len(), 1);
        assert_eq!(
            report.get("AUTHORS", "Authors of single-authored documents"),
            Some(&StatValue::Int(1))
        );
        assert!(report.get("AUTHORS", "Collaboration index").unwrap().is_missing());
    }

    #[test]
    fn test_to_dataframe() {
        let df = report().to_dataframe().unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), report().stats.len());
        let values = df.column("value").unwrap().str().unwrap();
        assert_eq!(values.get(0), Some("2015:2019"));
    }
}
