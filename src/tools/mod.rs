pub mod summary_sheet;

pub use summary_sheet::{summarize, summary_dataframe, ColumnSummary, SummarySheet};
