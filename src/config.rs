//! Run configuration.
//!
//! [`RfmOptions`] holds everything a run needs besides the input data. Use [`Default`] for the
//! common case or load the serializable part from JSON:
//!
//! ```rust
//! use rfm_segmentation::config::RfmOptions;
//!
//! let opts = RfmOptions::from_json_str(r#"{ "reference_date": "2010-12-10", "write_output": false }"#).unwrap();
//! assert_eq!(opts.reference_date.to_string(), "2010-12-10");
//! assert_eq!(opts.output_path.to_str(), Some("rfm.csv"));
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{RfmError, RfmResult};
use crate::observability::{PipelineObserver, PipelineSeverity};
use crate::rfm::default_reference_date;

/// Default output file name.
pub const DEFAULT_OUTPUT_PATH: &str = "rfm.csv";

/// Options controlling an RFM run.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RfmOptions {
    /// Date recency is measured against (midnight). Defaults to 2011-12-11.
    pub reference_date: NaiveDate,
    /// Where [`crate::pipeline::run`] writes the result table.
    pub output_path: PathBuf,
    /// If `false`, results are only returned, never written.
    pub write_output: bool,
    /// Append `recency_score`, `frequency_score` and `monetary_score` columns to the output.
    pub include_scores: bool,
    /// Optional observer for logging/alerts.
    #[serde(skip)]
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    #[serde(skip, default = "default_alert_threshold")]
    pub alert_at_or_above: PipelineSeverity,
}

fn default_alert_threshold() -> PipelineSeverity {
    PipelineSeverity::Critical
}

impl fmt::Debug for RfmOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RfmOptions")
            .field("reference_date", &self.reference_date)
            .field("output_path", &self.output_path)
            .field("write_output", &self.write_output)
            .field("include_scores", &self.include_scores)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for RfmOptions {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            write_output: true,
            include_scores: false,
            observer: None,
            alert_at_or_above: default_alert_threshold(),
        }
    }
}

impl RfmOptions {
    /// Options with an explicit reference date and all other fields defaulted.
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            ..Default::default()
        }
    }

    /// Parse options from a JSON object. Missing keys take their defaults.
    pub fn from_json_str(input: &str) -> RfmResult<Self> {
        serde_json::from_str(input).map_err(|e| RfmError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Read options from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> RfmResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
