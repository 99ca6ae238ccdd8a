//! End-to-end RFM run: prepare → calculate → segment → (optionally) write.
//!
//! Every stage result is reported to the observer configured on [`RfmOptions`].

use std::path::Path;

use crate::config::RfmOptions;
use crate::error::RfmResult;
use crate::ingestion::{ingest_from_path, transactions_schema};
use crate::observability::{report, PipelineContext, PipelineStage};
use crate::output::write_csv;
use crate::prepare::{prepare_data, PreparationStats};
use crate::rfm::calculate_rfm;
use crate::segment::{assign_segments, CustomerSegment, Segment};
use crate::types::DataSet;

/// Result of an RFM run.
#[derive(Debug, Clone, PartialEq)]
pub struct RfmReport {
    /// One entry per retained customer, ascending by customer id.
    pub customers: Vec<CustomerSegment>,
    pub preparation: PreparationStats,
}

impl RfmReport {
    /// Number of customers in `segment`.
    pub fn count(&self, segment: Segment) -> usize {
        self.customers.iter().filter(|c| c.segment == segment).count()
    }
}

/// Prepares, scores and segments `dataset` without writing anything.
///
/// ```rust
/// use rfm_segmentation::config::RfmOptions;
/// use rfm_segmentation::pipeline::analyze;
/// use rfm_segmentation::ingestion::transactions_schema;
/// use rfm_segmentation::types::DataSet;
///
/// let report = analyze(&DataSet::empty(transactions_schema()), &RfmOptions::default()).unwrap();
/// assert!(report.customers.is_empty());
/// ```
pub fn analyze(dataset: &DataSet, options: &RfmOptions) -> RfmResult<RfmReport> {
    let observer = options.observer.as_ref();
    let alert_at = options.alert_at_or_above;

    let prepared = prepare_data(dataset);
    report(
        observer,
        alert_at,
        &PipelineContext::new(PipelineStage::Prepare),
        &prepared,
        |p| p.transactions.len(),
    );
    let prepared = prepared?;

    let scored = calculate_rfm(&prepared.transactions, options.reference_date);
    report(
        observer,
        alert_at,
        &PipelineContext::new(PipelineStage::Calculate),
        &scored,
        Vec::len,
    );

    let scored = scored?;

    let segmented = assign_segments(scored);
    report(
        observer,
        alert_at,
        &PipelineContext::new(PipelineStage::Segment),
        &segmented,
        Vec::len,
    );

    Ok(RfmReport {
        customers: segmented?,
        preparation: prepared.stats,
    })
}

/// Runs [`analyze`] and writes the table to `options.output_path` when `options.write_output`.
pub fn run(dataset: &DataSet, options: &RfmOptions) -> RfmResult<RfmReport> {
    let report_out = analyze(dataset, options)?;
    if options.write_output {
        let path = &options.output_path;
        let written = write_csv(path, &report_out.customers, options.include_scores);
        report(
            options.observer.as_ref(),
            options.alert_at_or_above,
            &PipelineContext::with_path(PipelineStage::Write, path),
            &written,
            |n| *n,
        );
        written?;
        tracing::info!(path = %path.display(), customers = report_out.customers.len(), "rfm results saved");
    }
    Ok(report_out)
}

/// Loads a transaction file with [`transactions_schema`] and calls [`run`].
pub fn run_from_path(path: impl AsRef<Path>, options: &RfmOptions) -> RfmResult<RfmReport> {
    let dataset = ingest_from_path(path, &transactions_schema(), None, options)?;
    run(&dataset, options)
}
