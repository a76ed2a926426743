use std::time::Duration;
use time::OffsetDateTime;

/// Split a `;`-delimited field into trimmed, non-empty values.
pub fn split_items(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Round to two decimals, the precision every report table is shown with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn current_year() -> i64 {
    OffsetDateTime::now_utc().year() as i64
}

/// Human-readable elapsed time ("1h 02m 03s", "4.21s")
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}
