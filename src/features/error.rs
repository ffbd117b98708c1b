use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Required column '{0}' not found in observation table")]
    MissingColumn(String),

    // Every city group was too short for the requested lag.
    #[error("No training instances produced from {groups} city groups ({skipped} had too little history)")]
    EmptyResult { groups: usize, skipped: usize },

    #[error("Value '{value}' in column '{column}' was not seen when the encoder was fitted")]
    UnknownCategory { column: String, value: String },

    #[error("Feature schema mismatch: expected columns [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("Failed to parse date '{value}'")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Failed to assemble feature matrix")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
