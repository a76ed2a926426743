use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use techminer::common::{DatabaseName, FieldFilter, Metric, RangeFilter};

#[derive(Parser)]
#[command(name = "techminer")]
#[command(about = "Bibliometric indicators, rankings and trends over CSV record databases")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Descriptive statistics of the record set (documents, authors, keywords, ...)
    General(GeneralArgs),

    /// Per-item indicators of one field, ranked by a metric
    Performance(PerformanceArgs),

    /// Publications and citations per year
    Trend(TrendArgs),

    /// Non-null coverage of every record column
    Summary(SummaryArgs),

    /// Manage the project stopword list
    Stopwords(StopwordsArgs),
}

/// Options shared by every command that reads a database.
#[derive(Args, Clone, Debug)]
pub struct DatabaseArgs {
    /// Project root containing the `databases/` directory
    #[arg(short, long)]
    pub root_dir: Option<PathBuf>,

    /// Database to analyse (main, references, cited_by)
    #[arg(short, long)]
    pub database: Option<DatabaseName>,

    /// Inclusive year range, e.g. 2016:2019, :2018 or 2015:
    #[arg(long)]
    pub year_filter: Option<RangeFilter>,

    /// Inclusive range on global citations, e.g. 10:
    #[arg(long)]
    pub cited_by_filter: Option<RangeFilter>,

    /// Field filter `field=value1;value2`; repeat to intersect
    #[arg(short, long = "filter")]
    pub filters: Vec<FieldFilter>,

    /// JSON configuration file (defaults to <root_dir>/techminer.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone, Debug)]
pub struct GeneralArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Reference year for document ages (defaults to the current year)
    #[arg(long)]
    pub current_year: Option<i64>,

    /// Write the table as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
pub struct PerformanceArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Multi-valued field to group by (e.g. author_keywords, authors, countries)
    #[arg(long)]
    pub field: Option<String>,

    /// OCCGC, OCC, global_citations, local_citations, h_index, g_index or m_index
    #[arg(short, long)]
    pub metric: Option<Metric>,

    /// Keep the N best items
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Inclusive range on OCC
    #[arg(long)]
    pub occ_range: Option<RangeFilter>,

    /// Inclusive range on global citations of the item
    #[arg(long)]
    pub gc_range: Option<RangeFilter>,

    /// Report exactly these items; ranges and top-N are ignored
    #[arg(long, value_delimiter = ';')]
    pub custom_items: Option<Vec<String>>,

    /// Trailing years used for the growth indicators
    #[arg(short, long)]
    pub time_window: Option<u32>,

    /// Write the table as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
pub struct TrendArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Only report these columns (year is always kept)
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Write the table as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Write the table as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
pub struct StopwordsArgs {
    #[command(subcommand)]
    pub action: StopwordsAction,

    /// Project root; the list lives in <root_dir>/my_keywords/stopwords.txt
    #[arg(short, long, global = true)]
    pub root_dir: Option<PathBuf>,

    /// Explicit stopword file, overriding the project default
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum StopwordsAction {
    /// Append a term unless it is already listed
    Add { term: String },

    /// Deduplicate and sort the list in place
    Sort {
        #[arg(long)]
        descending: bool,
    },

    /// Print the list
    List,
}
