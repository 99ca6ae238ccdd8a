//! Tabular data model consumed by the RFM core.
//!
//! Loaders produce an in-memory [`DataSet`] shaped by a [`Schema`] (a list of typed
//! [`Field`]s). The preparation stage reads transactions out of it by column name.

use chrono::NaiveDateTime;

use crate::error::{RfmError, RfmResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Date and time without a time zone.
    Timestamp,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the expected shape of incoming data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Like [`Self::index_of`], but a missing field is a [`RfmError::SchemaMismatch`].
    pub fn require(&self, name: &str) -> RfmResult<usize> {
        self.index_of(name).ok_or_else(|| RfmError::SchemaMismatch {
            message: format!(
                "missing required column '{name}'. fields={:?}",
                self.field_names().collect::<Vec<_>>()
            ),
        })
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Naive date-time.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`] and for float NaN, which loaders use for missing numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of an `Int64` or `Float64` value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses the timestamp layouts found in transaction exports.
///
/// A bare `YYYY-MM-DD` date is read as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a dataset with a schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset with one extra trailing column computed from each row.
    ///
    /// If a column with the same name already exists it is replaced in place instead.
    pub fn with_column<F>(&self, field: Field, mut derive: F) -> Self
    where
        F: FnMut(&[Value]) -> Value,
    {
        let existing = self.schema.index_of(&field.name);
        let mut schema = self.schema.clone();
        match existing {
            Some(idx) => schema.fields[idx] = field,
            None => schema.fields.push(field),
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let value = derive(row.as_slice());
                let mut out = row.clone();
                match existing {
                    Some(idx) => out[idx] = value,
                    None => out.push(value),
                }
                out
            })
            .collect();

        Self { schema, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("Quantity", DataType::Int64),
            Field::new("Price", DataType::Float64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Int64(2), Value::Float64(1.5)],
                vec![Value::Int64(3), Value::Null],
            ],
        )
    }

    #[test]
    fn require_reports_available_fields() {
        let ds = sample_dataset();
        assert_eq!(ds.schema.require("Price").unwrap(), 1);
        let msg = ds.schema.require("Invoice").unwrap_err().to_string();
        assert!(msg.contains("missing required column 'Invoice'"));
        assert!(msg.contains("Quantity"));
    }

    #[test]
    fn with_column_appends_derived_values() {
        let ds = sample_dataset();
        let out = ds.with_column(Field::new("Double", DataType::Float64), |row| {
            match row[1].as_f64() {
                Some(v) => Value::Float64(v * 2.0),
                None => Value::Null,
            }
        });

        assert_eq!(out.schema.index_of("Double"), Some(2));
        assert_eq!(out.rows[0][2], Value::Float64(3.0));
        assert_eq!(out.rows[1][2], Value::Null);
        // Original unchanged
        assert_eq!(ds.schema.fields.len(), 2);
    }

    #[test]
    fn with_column_replaces_existing_column() {
        let ds = sample_dataset();
        let out = ds.with_column(Field::new("Quantity", DataType::Int64), |_| Value::Int64(0));
        assert_eq!(out.schema.fields.len(), 2);
        assert_eq!(out.rows[0][0], Value::Int64(0));
    }

    #[test]
    fn parse_timestamp_accepts_common_layouts() {
        use super::parse_timestamp;
        use chrono::NaiveDate;

        let expected = NaiveDate::from_ymd_opt(2010, 12, 1)
            .unwrap()
            .and_hms_opt(8, 26, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2010-12-01 08:26:00"), Some(expected));
        assert_eq!(parse_timestamp("2010-12-01 08:26"), Some(expected));
        assert_eq!(parse_timestamp("2010-12-01T08:26:00"), Some(expected));
        assert_eq!(parse_timestamp("12/1/2010 8:26"), Some(expected));
        assert_eq!(
            parse_timestamp("2010-12-01"),
            NaiveDate::from_ymd_opt(2010, 12, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn missing_covers_null_and_nan() {
        assert!(Value::Null.is_missing());
        assert!(Value::Float64(f64::NAN).is_missing());
        assert!(!Value::Float64(0.0).is_missing());
        assert!(!Value::Utf8(String::new()).is_missing());
    }
}
