//! `rfm-segmentation` computes RFM (Recency, Frequency, Monetary) customer segments from a
//! transaction log held in an in-memory [`types::DataSet`].
//!
//! For each customer it derives three behavioral metrics, buckets each into quintile scores
//! against the whole customer population, and maps the (recency, frequency) score pair to one
//! of ten named segments.
//!
//! ## Stages
//!
//! 1. [`prepare`]: derive `TotalPrice`, drop incomplete rows, drop canceled invoices
//! 2. [`rfm`]: aggregate per customer, drop non-positive spenders, assign 1–5 scores
//! 3. [`segment`]: first-match lookup in [`segment::SEGMENT_RULES`]
//! 4. [`output`]: write `Customer ID,recency,frequency,monetary,segment` as CSV
//!
//! [`pipeline::run`] chains them; [`ingestion`] loads CSV/JSON transaction files.
//!
//! ## Quick example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use rfm_segmentation::config::RfmOptions;
//! use rfm_segmentation::pipeline::run_from_path;
//! use rfm_segmentation::segment::Segment;
//!
//! # fn main() -> Result<(), rfm_segmentation::RfmError> {
//! let opts = RfmOptions {
//!     output_path: "segments.csv".into(),
//!     ..RfmOptions::with_reference_date(NaiveDate::from_ymd_opt(2011, 12, 11).unwrap())
//! };
//! let report = run_from_path("online_retail_II.csv", &opts)?;
//! println!("champions={}", report.count(Segment::Champions));
//! # Ok(())
//! # }
//! ```
//!
//! ## Scoring rules
//!
//! - recency: days since the latest invoice; the most recent fifth scores 5
//! - frequency: distinct invoices, ranked with ties broken by customer order; the top fifth
//!   scores 5
//! - monetary: total spend; the top fifth scores 5
//!
//! A metric that cannot be split into five buckets fails with
//! [`RfmError::DegenerateQuantiles`]. An empty population yields an empty table.
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`processing`]: generic filtering and quantile helpers
//! - [`config`]: run options
//! - [`observability`]: observer hooks for logging/alerts
//! - [`error`]: the crate's error type

pub mod config;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod prepare;
pub mod processing;
pub mod rfm;
pub mod segment;
pub mod types;

pub use error::{RfmError, RfmResult};
