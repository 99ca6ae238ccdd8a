//! Loading transaction logs into a [`crate::types::DataSet`].
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) with
//! [`transactions_schema`]. Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod unified;

pub use unified::{ingest_from_path, transactions_schema, IngestionFormat};
