use flate2::read::GzDecoder;
use log::{debug, info};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use super::RecordSet;
use crate::common::{DatabaseName, FieldFilter, RangeFilter};
use crate::error::{Result, TechminerError};

/// Which database to load and how to narrow it down before any indicator is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseParams {
    pub root_dir: PathBuf,
    pub database: DatabaseName,
    pub year_filter: RangeFilter,
    pub cited_by_filter: RangeFilter,
    /// Applied in order; the result does not depend on that order.
    pub filters: Vec<FieldFilter>,
}

impl Default for DatabaseParams {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./"),
            database: DatabaseName::Main,
            year_filter: RangeFilter::UNBOUNDED,
            cited_by_filter: RangeFilter::UNBOUNDED,
            filters: Vec::new(),
        }
    }
}

impl DatabaseParams {
    pub fn for_root<P: Into<PathBuf>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database.path_under(&self.root_dir)
    }
}

/// Anything that can hand out a filtered record set.
pub trait RecordSource {
    fn read(&self, params: &DatabaseParams) -> Result<RecordSet>;
}

/// Year, citation and field filters in the order the reader applies them.
pub fn apply_filters(records: RecordSet, params: &DatabaseParams) -> Result<RecordSet> {
    let mut records = records
        .filter_by_year(params.year_filter)?
        .filter_by_citations(params.cited_by_filter)?;

    for filter in &params.filters {
        records = records.filter_by_field(filter)?;
    }

    Ok(records)
}

/// Reads the gzipped CSV databases of a project directory. Nothing is cached;
/// each call reloads the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordReader;

impl RecordReader {
    pub fn new() -> Self {
        Self
    }

    /// Load and deduplicate a database without applying any filter.
    pub fn load<P: AsRef<Path>>(&self, root_dir: P, database: DatabaseName) -> Result<RecordSet> {
        let path = database.path_under(root_dir);
        info!("Loading database '{}' from {}", database.as_str(), path.display());

        let df = read_database_file(&path)?;
        debug!("Read {} rows x {} columns", df.height(), df.width());

        RecordSet::from_dataframe(df)?.deduplicate()
    }
}

impl RecordSource for RecordReader {
    fn read(&self, params: &DatabaseParams) -> Result<RecordSet> {
        let records = self.load(&params.root_dir, params.database)?;
        let records = apply_filters(records, params)?;
        info!("Records after filtering: {}", records.len());
        Ok(records)
    }
}

/// An already loaded set can stand in for a database; only the filters apply.
impl RecordSource for RecordSet {
    fn read(&self, params: &DatabaseParams) -> Result<RecordSet> {
        apply_filters(self.clone(), params)
    }
}

/// Decompress a `.csv.gz` database and parse it with a header row.
pub fn read_database_file(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(TechminerError::NotFound(format!(
            "database file {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::sample_records;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_database(root: &Path, name: DatabaseName, csv: &str) {
        let path = name.path_under(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(csv.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    const CSV: &str = "article,year,global_citations,local_citations,num_authors,authors\n\
                       A1,2015,10,2,2,Smith J; Lee K\n\
                       A2,2016,5,1,1,Smith J\n\
                       A2,2016,5,1,1,Smith J\n\
                       A3,2017,30,4,3,Chen L; Wang Y\n";

    #[test]
    fn test_load_deduplicates() {
        let dir = tempdir().unwrap();
        write_database(dir.path(), DatabaseName::Main, CSV);

        let records = RecordReader::new().load(dir.path(), DatabaseName::Main).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records.dataframe().column("year").unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn test_read_applies_filters() {
        let dir = tempdir().unwrap();
        write_database(dir.path(), DatabaseName::CitedBy, CSV);

        let params = DatabaseParams {
            root_dir: dir.path().to_path_buf(),
            database: DatabaseName::CitedBy,
            year_filter: RangeFilter::new(Some(2016), None),
            cited_by_filter: RangeFilter::UNBOUNDED,
            filters: vec![FieldFilter::new("authors", vec!["Smith J".to_string()])],
        };

        let records = RecordReader::new().read(&params).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let result = RecordReader::new().read(&DatabaseParams::for_root(dir.path()));
        assert!(matches!(result, Err(TechminerError::NotFound(_))));
    }

    #[test]
    fn test_record_set_as_source() {
        let params = DatabaseParams {
            cited_by_filter: RangeFilter::new(None, Some(5)),
            ..DatabaseParams::default()
        };
        let records = sample_records().read(&params).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_params_from_json_defaults() {
        let params: DatabaseParams =
            serde_json::from_str(r#"{"database": "references", "year_filter": [2016, null]}"#).unwrap();
        assert_eq!(params.database, DatabaseName::References);
        assert_eq!(params.year_filter, RangeFilter::new(Some(2016), None));
        assert_eq!(params.root_dir, PathBuf::from("./"));
        assert!(params.filters.is_empty());

        let bad = serde_json::from_str::<DatabaseParams>(r#"{"year_filter": [2016]}"#);
        assert!(bad.is_err());
    }
}
