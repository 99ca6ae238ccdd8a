//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which loads a file into an in-memory
//! [`crate::types::DataSet`] using a provided [`crate::types::Schema`].
//!
//! - If no [`IngestionFormat`] is forced, the format is inferred from the file extension.
//! - If an observer is configured on [`crate::config::RfmOptions`], success/failure/alerts are
//!   reported to it under [`PipelineStage::Ingest`].

use std::path::Path;

use crate::config::RfmOptions;
use crate::error::{RfmError, RfmResult};
use crate::observability::{report, PipelineContext, PipelineStage};
use crate::prepare::columns;
use crate::types::{DataSet, DataType, Field, Schema};

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Schema of the transaction log expected by [`crate::prepare::prepare_data`].
///
/// `Customer ID` is read as a float because exports write nullable ids as `13085.0`; preparation
/// converts it back to an integer key.
pub fn transactions_schema() -> Schema {
    Schema::new(vec![
        Field::new(columns::INVOICE, DataType::Utf8),
        Field::new(columns::CUSTOMER_ID, DataType::Float64),
        Field::new(columns::INVOICE_DATE, DataType::Timestamp),
        Field::new(columns::QUANTITY, DataType::Float64),
        Field::new(columns::PRICE, DataType::Float64),
    ])
}

/// Loads `path` into a [`DataSet`] shaped by `schema`.
///
/// `format` overrides extension-based inference. The observer on `options` (if any) is notified.
///
/// ```no_run
/// use rfm_segmentation::config::RfmOptions;
/// use rfm_segmentation::ingestion::{ingest_from_path, transactions_schema};
///
/// # fn main() -> Result<(), rfm_segmentation::RfmError> {
/// let ds = ingest_from_path("online_retail_II.csv", &transactions_schema(), None, &RfmOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    format: Option<IngestionFormat>,
    options: &RfmOptions,
) -> RfmResult<DataSet> {
    let path = path.as_ref();
    let ctx = PipelineContext::with_path(PipelineStage::Ingest, path);

    let result = match format {
        Some(f) => Ok(f),
        None => infer_format_from_path(path),
    }
    .and_then(|fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, schema),
        IngestionFormat::Json => json::ingest_json_from_path(path, schema),
    });

    report(
        options.observer.as_ref(),
        options.alert_at_or_above,
        &ctx,
        &result,
        DataSet::row_count,
    );
    result
}

fn infer_format_from_path(path: &Path) -> RfmResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RfmError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| RfmError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{infer_format_from_path, IngestionFormat};

    #[test]
    fn format_is_inferred_case_insensitively() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("ndjson"), Some(IngestionFormat::Json));
        assert_eq!(IngestionFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn path_without_extension_is_rejected() {
        let err = infer_format_from_path(Path::new("transactions")).unwrap_err();
        assert!(err.to_string().contains("path has no extension"));
    }
}
