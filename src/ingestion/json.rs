//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"Invoice": "489434"}, {"Invoice": "489435"}]`
//! - Newline-delimited JSON (NDJSON), one object per line
//!
//! A key absent from an object is read as [`Value::Null`], the same as an explicit `null`.

use std::fs;
use std::path::Path;

use crate::error::{RfmError, RfmResult};
use crate::types::{parse_timestamp, DataSet, DataType, Schema, Value};

/// Ingest a JSON or NDJSON file into an in-memory [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> RfmResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text, schema)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> RfmResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RfmError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => ingest_json_values(&items, schema),
            serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v), schema),
            _ => Err(RfmError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        let values = trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str::<serde_json::Value>)
            .collect::<Result<Vec<_>, _>>()?;
        ingest_json_values(&values, schema)
    }
}

fn ingest_json_values(values: &[serde_json::Value], schema: &Schema) -> RfmResult<DataSet> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(values.len());
    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| RfmError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let row = schema
            .fields
            .iter()
            .map(|field| match obj.get(&field.name) {
                Some(jv) => convert_json_value(row_num, &field.name, field.data_type, jv),
                None => Ok(Value::Null),
            })
            .collect::<RfmResult<Vec<_>>>()?;
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn convert_json_value(
    row: usize,
    column: &str,
    data_type: DataType,
    v: &serde_json::Value,
) -> RfmResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    let parse_error = |message: &str| RfmError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match data_type {
        // Invoice numbers are often exported as bare JSON numbers.
        DataType::Utf8 => match v {
            serde_json::Value::String(s) => Ok(Value::Utf8(s.clone())),
            serde_json::Value::Number(n) => Ok(Value::Utf8(n.to_string())),
            _ => Err(parse_error("expected string")),
        },
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| parse_error("expected bool")),
        DataType::Int64 => v
            .as_i64()
            .map(Value::Int64)
            .ok_or_else(|| parse_error("expected integer number in i64 range")),
        DataType::Float64 => v.as_f64().map(Value::Float64).ok_or_else(|| parse_error("expected number")),
        DataType::Timestamp => v
            .as_str()
            .and_then(parse_timestamp)
            .map(Value::Timestamp)
            .ok_or_else(|| parse_error("expected timestamp string")),
    }
}
