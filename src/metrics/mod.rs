pub mod general;
pub mod performance;
pub mod trend;

pub use general::{GeneralMetrics, GeneralOptions, GeneralReport, Stat, StatValue};
pub use performance::{
    columns_for, PerformanceMetrics, PerformanceOptions, PerformanceReport, DEFAULT_TIME_WINDOW,
};
pub use trend::{yearly_trend, TrendMetrics, TrendOptions, TrendReport};
