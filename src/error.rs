use thiserror::Error;

use crate::rfm::Metric;

/// Convenience result type for RFM operations.
pub type RfmResult<T> = Result<T, RfmError>;

/// Error type returned by ingestion, scoring, segmentation and output functions.
///
/// Rows dropped during preparation are not errors; they are only counted in
/// [`crate::prepare::PreparationStats`].
#[derive(Debug, Error)]
pub enum RfmError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error (input data or configuration).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not conform to the expected schema (missing required columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A present value has a type or shape that cannot be used (e.g. a fractional customer id).
    #[error("invalid value in column '{column}': {message}")]
    InvalidValue { column: String, message: String },

    /// Quintile cutting is underdetermined for a metric.
    #[error(
        "cannot split {metric} into 5 quantile buckets: {distinct} distinct value(s) or duplicate bucket edges"
    )]
    DegenerateQuantiles { metric: Metric, distinct: usize },

    /// An RF code matched none of the segment rules.
    #[error("rfm code '{code}' matches no segment rule")]
    UnmatchedSegment { code: String },

    /// Configuration could not be interpreted.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}
