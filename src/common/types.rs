use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, TechminerError};

lazy_static! {
    /// `lo:hi` with either side optional, e.g. `2016:2018`, `:100`, `5:`, `:`
    static ref RANGE_PATTERN: Regex =
        Regex::new(r"^\s*(-?\d+)?\s*:\s*(-?\d+)?\s*$").unwrap();
}

/// Inclusive `(min, max)` filter where an absent bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<i64>>", into = "Vec<Option<i64>>")]
pub struct RangeFilter {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RangeFilter {
    pub const UNBOUNDED: RangeFilter = RangeFilter { min: None, max: None };

    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// Build a filter from a bound list; anything but exactly two bounds is rejected.
    pub fn from_bounds(bounds: &[Option<i64>]) -> Result<Self> {
        match bounds {
            [min, max] => Ok(Self::new(*min, *max)),
            _ => Err(TechminerError::InvalidArgument(format!(
                "a range filter takes exactly two bounds, got {}",
                bounds.len()
            ))),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Optional values only pass an unbounded filter.
    pub fn contains_opt(&self, value: Option<i64>) -> bool {
        match value {
            Some(v) => self.contains(v),
            None => self.is_unbounded(),
        }
    }
}

impl TryFrom<Vec<Option<i64>>> for RangeFilter {
    type Error = TechminerError;

    fn try_from(bounds: Vec<Option<i64>>) -> Result<Self> {
        Self::from_bounds(&bounds)
    }
}

impl From<RangeFilter> for Vec<Option<i64>> {
    fn from(range: RangeFilter) -> Self {
        vec![range.min, range.max]
    }
}

impl FromStr for RangeFilter {
    type Err = TechminerError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = RANGE_PATTERN.captures(s).ok_or_else(|| {
            TechminerError::InvalidArgument(format!(
                "range '{}' must look like 'min:max' (either side may be empty)",
                s
            ))
        })?;

        let bound = |idx: usize| -> Result<Option<i64>> {
            caps.get(idx)
                .map(|m| {
                    m.as_str().parse::<i64>().map_err(|e| {
                        TechminerError::InvalidArgument(format!("bad bound '{}': {}", m.as_str(), e))
                    })
                })
                .transpose()
        };

        Ok(Self::new(bound(1)?, bound(2)?))
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |b: Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", side(self.min), side(self.max))
    }
}

/// Indicator used to rank items and to pick the columns a report surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    /// Union of the top items by OCC and by global citations.
    Occgc,
    Occ,
    GlobalCitations,
    LocalCitations,
    HIndex,
    GIndex,
    MIndex,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Occgc,
        Metric::Occ,
        Metric::GlobalCitations,
        Metric::LocalCitations,
        Metric::HIndex,
        Metric::GIndex,
        Metric::MIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Occgc => "OCCGC",
            Metric::Occ => "OCC",
            Metric::GlobalCitations => "global_citations",
            Metric::LocalCitations => "local_citations",
            Metric::HIndex => "h_index",
            Metric::GIndex => "g_index",
            Metric::MIndex => "m_index",
        }
    }
}

impl FromStr for Metric {
    type Err = TechminerError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| TechminerError::InvalidMetric(s.to_string()))
    }
}

impl TryFrom<String> for Metric {
    type Error = TechminerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.as_str().to_string()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named record databases under `<root_dir>/databases/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DatabaseName {
    #[default]
    Main,
    References,
    CitedBy,
}

impl DatabaseName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseName::Main => "main",
            DatabaseName::References => "references",
            DatabaseName::CitedBy => "cited_by",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            DatabaseName::Main => "_main.csv.gz",
            DatabaseName::References => "_references.csv.gz",
            DatabaseName::CitedBy => "_cited_by.csv.gz",
        }
    }

    pub fn path_under<P: AsRef<Path>>(&self, root_dir: P) -> PathBuf {
        root_dir.as_ref().join("databases").join(self.file_name())
    }
}

impl FromStr for DatabaseName {
    type Err = TechminerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(DatabaseName::Main),
            "references" => Ok(DatabaseName::References),
            "cited_by" => Ok(DatabaseName::CitedBy),
            other => Err(TechminerError::NotFound(format!("database '{}'", other))),
        }
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = TechminerError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.as_str().to_string()
    }
}

/// Keep records whose `field` holds at least one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub values: Vec<String>,
}

impl FieldFilter {
    pub fn new<S: Into<String>>(field: S, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }
}

impl FromStr for FieldFilter {
    type Err = TechminerError;

    /// `field=value1;value2`
    fn from_str(s: &str) -> Result<Self> {
        let (field, values) = s.split_once('=').ok_or_else(|| {
            TechminerError::InvalidArgument(format!("filter '{}' must look like 'field=a;b'", s))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(TechminerError::InvalidArgument(format!(
                "filter '{}' has no field name",
                s
            )));
        }
        Ok(Self::new(field, super::split_items(values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_inclusive() {
        let range = RangeFilter::new(Some(2016), Some(2018));
        assert!(range.contains(2016));
        assert!(range.contains(2018));
        assert!(!range.contains(2015));
        assert!(!range.contains(2019));
    }

    #[test]
    fn test_range_open_sides() {
        assert!(RangeFilter::new(None, Some(10)).contains(i64::MIN));
        assert!(RangeFilter::new(Some(10), None).contains(i64::MAX));
        assert!(RangeFilter::UNBOUNDED.contains_opt(None));
        assert!(!RangeFilter::new(Some(1), None).contains_opt(None));
    }

    #[test]
    fn test_range_from_bounds_rejects_wrong_arity() {
        assert!(RangeFilter::from_bounds(&[Some(1)]).is_err());
        assert!(RangeFilter::from_bounds(&[Some(1), None, Some(3)]).is_err());
        assert_eq!(
            RangeFilter::from_bounds(&[None, Some(3)]).unwrap(),
            RangeFilter::new(None, Some(3))
        );
    }

    #[test]
    fn test_range_parse() {
        assert_eq!("2016:2018".parse::<RangeFilter>().unwrap(), RangeFilter::new(Some(2016), Some(2018)));
        assert_eq!(":100".parse::<RangeFilter>().unwrap(), RangeFilter::new(None, Some(100)));
        assert_eq!("5:".parse::<RangeFilter>().unwrap(), RangeFilter::new(Some(5), None));
        assert_eq!(":".parse::<RangeFilter>().unwrap(), RangeFilter::UNBOUNDED);
        assert!(matches!(
            "2016".parse::<RangeFilter>(),
            Err(TechminerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_range_json_shape() {
        let range: RangeFilter = serde_json::from_str("[null, 5]").unwrap();
        assert_eq!(range, RangeFilter::new(None, Some(5)));
        assert!(serde_json::from_str::<RangeFilter>("[1, 2, 3]").is_err());
        assert_eq!(serde_json::to_string(&range).unwrap(), "[null,5]");
    }

    #[test]
    fn test_metric_roundtrip_names() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
        assert!(matches!(
            "citations".parse::<Metric>(),
            Err(TechminerError::InvalidMetric(_))
        ));
    }

    #[test]
    fn test_database_name_mapping() {
        assert_eq!(
            DatabaseName::CitedBy.path_under("/proj"),
            PathBuf::from("/proj/databases/_cited_by.csv.gz")
        );
        assert!(matches!(
            "scopus".parse::<DatabaseName>(),
            Err(TechminerError::NotFound(_))
        ));
    }

    #[test]
    fn test_field_filter_parse() {
        let filter: FieldFilter = "countries= China ; USA".parse().unwrap();
        assert_eq!(filter.field, "countries");
        assert_eq!(filter.values, vec!["China".to_string(), "USA".to_string()]);
        assert!("countries".parse::<FieldFilter>().is_err());
    }
}
