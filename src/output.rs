//! CSV output of segmented customers.
//!
//! Columns: `Customer ID,recency,frequency,monetary,segment`, optionally followed by
//! `recency_score,frequency_score,monetary_score`. One row per customer in ascending id order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::RfmResult;
use crate::segment::{CustomerSegment, Segment};

#[derive(Serialize)]
struct OutputRow {
    #[serde(rename = "Customer ID")]
    customer_id: i64,
    recency: i64,
    frequency: u64,
    monetary: f64,
    segment: Segment,
}

#[derive(Serialize)]
struct ScoredOutputRow {
    #[serde(rename = "Customer ID")]
    customer_id: i64,
    recency: i64,
    frequency: u64,
    monetary: f64,
    segment: Segment,
    recency_score: u8,
    frequency_score: u8,
    monetary_score: u8,
}

/// Writes `customers` as CSV to `writer`. Returns the number of data rows written.
///
/// An empty slice still produces the header line.
pub fn write_csv_to_writer<W: Write>(
    writer: W,
    customers: &[CustomerSegment],
    include_scores: bool,
) -> RfmResult<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    if include_scores {
        wtr.write_record([
            "Customer ID",
            "recency",
            "frequency",
            "monetary",
            "segment",
            "recency_score",
            "frequency_score",
            "monetary_score",
        ])?;
    } else {
        wtr.write_record(["Customer ID", "recency", "frequency", "monetary", "segment"])?;
    }

    for c in customers {
        let m = &c.customer.metrics;
        if include_scores {
            wtr.serialize(ScoredOutputRow {
                customer_id: m.customer_id,
                recency: m.recency,
                frequency: m.frequency,
                monetary: m.monetary,
                segment: c.segment,
                recency_score: c.customer.recency_score,
                frequency_score: c.customer.frequency_score,
                monetary_score: c.customer.monetary_score,
            })?;
        } else {
            wtr.serialize(OutputRow {
                customer_id: m.customer_id,
                recency: m.recency,
                frequency: m.frequency,
                monetary: m.monetary,
                segment: c.segment,
            })?;
        }
    }

    wtr.flush()?;
    Ok(customers.len())
}

/// Writes `customers` as CSV to `path`, creating or truncating the file.
pub fn write_csv(
    path: impl AsRef<Path>,
    customers: &[CustomerSegment],
    include_scores: bool,
) -> RfmResult<usize> {
    let file = File::create(path)?;
    write_csv_to_writer(file, customers, include_scores)
}
