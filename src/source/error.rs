use crate::features::error::FeatureError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Failed to determine warehouse root directory")]
    RootResolution,

    #[error("Table '{table}' not found in {location}")]
    TableNotFound { table: String, location: String },

    // The backing store could not be read, or the query could not be planned.
    #[error("Data unavailable for table '{table}'")]
    DataUnavailable {
        table: String,
        #[source]
        source: PolarsError,
    },

    #[error("Table '{table}' does not hold valid observations")]
    InvalidTable {
        table: String,
        #[source]
        source: FeatureError,
    },
}
