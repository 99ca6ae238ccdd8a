//! Data preparation: turn raw transaction rows into clean, typed [`Transaction`]s.
//!
//! Steps run in a fixed order:
//!
//! 1. [`derive_total_price`] adds `TotalPrice = Quantity * Price`
//! 2. [`drop_missing_required`] removes rows missing any required field
//! 3. [`drop_cancelled`] removes rows whose invoice id contains `"C"`
//!
//! Dropped rows are not errors; they are counted in [`PreparationStats`].

use chrono::NaiveDateTime;

use crate::error::{RfmError, RfmResult};
use crate::processing::{drop_containing, drop_missing};
use crate::types::{parse_timestamp, DataSet, DataType, Field, Value};

/// Canonical column names of the transaction table.
pub mod columns {
    /// Invoice identifier; a `C` anywhere marks a cancellation.
    pub const INVOICE: &str = "Invoice";
    /// Customer identifier (integer-valued, nullable).
    pub const CUSTOMER_ID: &str = "Customer ID";
    /// Invoice timestamp.
    pub const INVOICE_DATE: &str = "InvoiceDate";
    /// Signed quantity.
    pub const QUANTITY: &str = "Quantity";
    /// Unit price.
    pub const PRICE: &str = "Price";
    /// Derived `Quantity * Price`.
    pub const TOTAL_PRICE: &str = "TotalPrice";

    /// Fields that must be present for a row to survive preparation.
    pub const REQUIRED: [&str; 5] = [INVOICE, CUSTOMER_ID, INVOICE_DATE, QUANTITY, PRICE];
}

/// Marker character for canceled invoices.
pub const CANCELLATION_MARKER: &str = "C";

/// One completed sale line item.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub invoice: String,
    pub customer_id: i64,
    pub invoice_date: NaiveDateTime,
    pub quantity: f64,
    pub price: f64,
    pub total_price: f64,
}

/// Row counts observed while preparing a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreparationStats {
    /// Rows in the input dataset.
    pub input_rows: usize,
    /// Rows removed because a required field was missing.
    pub dropped_missing: usize,
    /// Rows removed because the invoice was canceled.
    pub dropped_cancelled: usize,
    /// Rows converted into transactions.
    pub output_rows: usize,
}

/// Output of [`prepare_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub transactions: Vec<Transaction>,
    pub stats: PreparationStats,
}

/// Appends `TotalPrice = Quantity * Price` to every row.
///
/// The result is null when either input is missing or non-numeric.
pub fn derive_total_price(dataset: &DataSet) -> RfmResult<DataSet> {
    let qty_idx = dataset.schema.require(columns::QUANTITY)?;
    let price_idx = dataset.schema.require(columns::PRICE)?;

    Ok(dataset.with_column(
        Field::new(columns::TOTAL_PRICE, DataType::Float64),
        |row| match (row[qty_idx].as_f64(), row[price_idx].as_f64()) {
            (Some(q), Some(p)) if !q.is_nan() && !p.is_nan() => Value::Float64(q * p),
            _ => Value::Null,
        },
    ))
}

/// Removes rows missing any of [`columns::REQUIRED`].
pub fn drop_missing_required(dataset: &DataSet) -> RfmResult<DataSet> {
    drop_missing(dataset, &columns::REQUIRED)
}

/// Removes rows whose invoice id contains [`CANCELLATION_MARKER`].
pub fn drop_cancelled(dataset: &DataSet) -> RfmResult<DataSet> {
    drop_containing(dataset, columns::INVOICE, CANCELLATION_MARKER)
}

/// Runs all preparation steps and converts surviving rows into [`Transaction`]s.
///
/// # Examples
///
/// ```rust
/// use rfm_segmentation::prepare::{columns, prepare_data};
/// use rfm_segmentation::types::{DataSet, DataType, Field, Schema, Value};
///
/// let schema = Schema::new(vec![
///     Field::new(columns::INVOICE, DataType::Utf8),
///     Field::new(columns::CUSTOMER_ID, DataType::Int64),
///     Field::new(columns::INVOICE_DATE, DataType::Utf8),
///     Field::new(columns::QUANTITY, DataType::Int64),
///     Field::new(columns::PRICE, DataType::Float64),
/// ]);
/// let ds = DataSet::new(
///     schema,
///     vec![
///         vec![
///             Value::Utf8("489434".into()),
///             Value::Int64(13085),
///             Value::Utf8("2009-12-01 07:45:00".into()),
///             Value::Int64(12),
///             Value::Float64(6.95),
///         ],
///         vec![
///             Value::Utf8("C489449".into()),
///             Value::Int64(13085),
///             Value::Utf8("2009-12-01 10:33:00".into()),
///             Value::Int64(-12),
///             Value::Float64(6.95),
///         ],
///     ],
/// );
///
/// let prepared = prepare_data(&ds).unwrap();
/// assert_eq!(prepared.transactions.len(), 1);
/// assert_eq!(prepared.stats.dropped_cancelled, 1);
/// ```
pub fn prepare_data(dataset: &DataSet) -> RfmResult<PreparedData> {
    let with_total = derive_total_price(dataset)?;
    let complete = drop_missing_required(&with_total)?;
    let kept = drop_cancelled(&complete)?;

    let stats = PreparationStats {
        input_rows: dataset.row_count(),
        dropped_missing: with_total.row_count() - complete.row_count(),
        dropped_cancelled: complete.row_count() - kept.row_count(),
        output_rows: kept.row_count(),
    };
    tracing::debug!(
        input_rows = stats.input_rows,
        dropped_missing = stats.dropped_missing,
        dropped_cancelled = stats.dropped_cancelled,
        output_rows = stats.output_rows,
        "prepared transactions"
    );

    let transactions = to_transactions(&kept)?;
    Ok(PreparedData {
        transactions,
        stats,
    })
}

fn to_transactions(dataset: &DataSet) -> RfmResult<Vec<Transaction>> {
    let schema = &dataset.schema;
    let invoice_idx = schema.require(columns::INVOICE)?;
    let customer_idx = schema.require(columns::CUSTOMER_ID)?;
    let date_idx = schema.require(columns::INVOICE_DATE)?;
    let qty_idx = schema.require(columns::QUANTITY)?;
    let price_idx = schema.require(columns::PRICE)?;
    let total_idx = schema.require(columns::TOTAL_PRICE)?;

    dataset
        .rows
        .iter()
        .map(|row| {
            let total_price = numeric(columns::TOTAL_PRICE, &row[total_idx])?;
            Ok(Transaction {
                invoice: invoice_id(&row[invoice_idx])?,
                customer_id: customer_id(&row[customer_idx])?,
                invoice_date: timestamp(&row[date_idx])?,
                quantity: numeric(columns::QUANTITY, &row[qty_idx])?,
                price: numeric(columns::PRICE, &row[price_idx])?,
                total_price,
            })
        })
        .collect()
}

fn invalid(column: &str, value: &Value, expected: &str) -> RfmError {
    RfmError::InvalidValue {
        column: column.to_string(),
        message: format!("expected {expected}, got {value:?}"),
    }
}

fn invoice_id(value: &Value) -> RfmResult<String> {
    match value {
        Value::Utf8(s) => Ok(s.clone()),
        Value::Int64(v) => Ok(v.to_string()),
        other => Err(invalid(columns::INVOICE, other, "string invoice id")),
    }
}

fn customer_id(value: &Value) -> RfmResult<i64> {
    match value {
        Value::Int64(v) => Ok(*v),
        Value::Float64(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(*v as i64),
        other => Err(invalid(columns::CUSTOMER_ID, other, "integer customer id")),
    }
}

fn timestamp(value: &Value) -> RfmResult<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Utf8(s) => {
            parse_timestamp(s).ok_or_else(|| invalid(columns::INVOICE_DATE, value, "timestamp"))
        }
        other => Err(invalid(columns::INVOICE_DATE, other, "timestamp")),
    }
}

fn numeric(column: &str, value: &Value) -> RfmResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| invalid(column, value, "number"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{columns, derive_total_price, drop_cancelled, prepare_data};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new(columns::INVOICE, DataType::Utf8),
            Field::new(columns::CUSTOMER_ID, DataType::Float64),
            Field::new(columns::INVOICE_DATE, DataType::Timestamp),
            Field::new(columns::QUANTITY, DataType::Int64),
            Field::new(columns::PRICE, DataType::Float64),
        ])
    }

    fn ts(day: u32) -> Value {
        Value::Timestamp(
            NaiveDate::from_ymd_opt(2011, 12, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn row(invoice: Value, customer: Value, qty: Value, price: Value) -> Vec<Value> {
        vec![invoice, customer, ts(1), qty, price]
    }

    fn utf8(s: &str) -> Value {
        Value::Utf8(s.to_string())
    }

    #[test]
    fn total_price_is_quantity_times_price() {
        let ds = DataSet::new(
            schema(),
            vec![
                row(utf8("1"), Value::Float64(100.0), Value::Int64(3), Value::Float64(2.5)),
                row(utf8("2"), Value::Float64(100.0), Value::Null, Value::Float64(2.5)),
            ],
        );
        let out = derive_total_price(&ds).unwrap();
        let idx = out.schema.index_of(columns::TOTAL_PRICE).unwrap();
        assert_eq!(out.rows[0][idx], Value::Float64(7.5));
        assert_eq!(out.rows[1][idx], Value::Null);
    }

    #[test]
    fn cancelled_invoices_are_removed() {
        let ds = DataSet::new(
            schema(),
            vec![
                row(utf8("C12345"), Value::Float64(1.0), Value::Int64(1), Value::Float64(1.0)),
                row(utf8("12345C"), Value::Float64(1.0), Value::Int64(1), Value::Float64(1.0)),
                row(utf8("12345"), Value::Float64(1.0), Value::Int64(1), Value::Float64(1.0)),
            ],
        );
        let out = drop_cancelled(&ds).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0][0], utf8("12345"));
    }

    #[test]
    fn prepare_counts_each_kind_of_drop() {
        let ds = DataSet::new(
            schema(),
            vec![
                row(utf8("1"), Value::Float64(100.0), Value::Int64(2), Value::Float64(10.0)),
                row(utf8("2"), Value::Null, Value::Int64(2), Value::Float64(10.0)),
                row(Value::Null, Value::Float64(100.0), Value::Int64(2), Value::Float64(10.0)),
                row(utf8("3"), Value::Float64(100.0), Value::Int64(2), Value::Float64(f64::NAN)),
                row(utf8("C4"), Value::Float64(100.0), Value::Int64(-2), Value::Float64(10.0)),
            ],
        );

        let prepared = prepare_data(&ds).unwrap();
        assert_eq!(prepared.stats.input_rows, 5);
        assert_eq!(prepared.stats.dropped_missing, 3);
        assert_eq!(prepared.stats.dropped_cancelled, 1);
        assert_eq!(prepared.stats.output_rows, 1);

        let t = &prepared.transactions[0];
        assert_eq!(t.invoice, "1");
        assert_eq!(t.customer_id, 100);
        assert_eq!(t.total_price, 20.0);
    }

    #[test]
    fn fractional_customer_id_is_rejected() {
        let ds = DataSet::new(
            schema(),
            vec![row(utf8("1"), Value::Float64(100.5), Value::Int64(1), Value::Float64(1.0))],
        );
        let err = prepare_data(&ds).unwrap_err();
        assert!(err.to_string().contains("invalid value in column 'Customer ID'"));
    }

    #[test]
    fn missing_required_column_is_schema_mismatch() {
        let schema = Schema::new(vec![
            Field::new(columns::INVOICE, DataType::Utf8),
            Field::new(columns::QUANTITY, DataType::Int64),
            Field::new(columns::PRICE, DataType::Float64),
        ]);
        let err = prepare_data(&DataSet::empty(schema)).unwrap_err();
        assert!(err.to_string().contains("missing required column 'Customer ID'"));
    }

    #[test]
    fn everything_dropped_yields_empty_output() {
        let ds = DataSet::new(
            schema(),
            vec![row(utf8("C1"), Value::Float64(1.0), Value::Int64(1), Value::Float64(1.0))],
        );
        let prepared = prepare_data(&ds).unwrap();
        assert!(prepared.transactions.is_empty());
        assert_eq!(prepared.stats.output_rows, 0);
    }
}
