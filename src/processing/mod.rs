//! Generic in-memory transformations used by the RFM stages.
//!
//! - [`filter`]: row filtering ([`drop_missing`], [`drop_containing`])
//! - [`quantile`]: population-wide ranking and quintile cutting ([`rank_first`], [`qcut`])
//!
//! ## Example: drop incomplete rows
//!
//! ```rust
//! use rfm_segmentation::processing::drop_missing;
//! use rfm_segmentation::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Int64),
//!     Field::new("score", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::Float64(10.0)],
//!         vec![Value::Int64(2), Value::Null],
//!     ],
//! );
//!
//! let kept = drop_missing(&ds, &["id", "score"]).unwrap();
//! assert_eq!(kept.row_count(), 1);
//! ```

pub mod filter;
pub mod quantile;

pub use filter::{drop_containing, drop_missing};
pub use quantile::{qcut, quantile_edges, rank_first, QUINTILES};
