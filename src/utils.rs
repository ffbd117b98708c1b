use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

const WAREHOUSE_DIR_NAME: &str = "weathercast_warehouse";

/// Default location of the file-backed warehouse, under the platform data directory.
pub fn default_warehouse_root() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(WAREHOUSE_DIR_NAME))
}

/// Converts a polars `Date` value (days since the Unix epoch) into a `NaiveDate`.
pub(crate) fn date_from_epoch_days(days: i32) -> NaiveDate {
    NaiveDate::default() + chrono::Duration::days(days as i64)
}

/// Seasonal features of a target day: day of year (1-based), month (1-12) and weekday
/// (0 = Monday).
pub(crate) fn calendar_features(date: NaiveDate) -> [f64; 3] {
    [
        date.ordinal() as f64,
        date.month() as f64,
        date.weekday().num_days_from_monday() as f64,
    ]
}
