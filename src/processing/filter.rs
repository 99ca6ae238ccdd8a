//! Row filtering for [`crate::types::DataSet`].

use crate::error::RfmResult;
use crate::types::{DataSet, Value};

/// Drops every row where any of `columns` is missing (see [`Value::is_missing`]).
///
/// Removal is all-or-nothing per row; nothing is imputed. Errors if a column is not in the schema.
pub fn drop_missing(dataset: &DataSet, columns: &[&str]) -> RfmResult<DataSet> {
    let idxs = columns
        .iter()
        .map(|name| dataset.schema.require(name))
        .collect::<RfmResult<Vec<_>>>()?;

    Ok(dataset.filter_rows(|row| {
        idxs.iter()
            .all(|&i| row.get(i).is_some_and(|v| !v.is_missing()))
    }))
}

/// Drops every row whose string value in `column` contains `needle` (case-sensitive).
///
/// Null and non-string cells never match and are kept.
pub fn drop_containing(dataset: &DataSet, column: &str, needle: &str) -> RfmResult<DataSet> {
    let idx = dataset.schema.require(column)?;
    Ok(dataset.filter_rows(|row| match row.get(idx) {
        Some(Value::Utf8(s)) => !s.contains(needle),
        _ => true,
    }))
}

#[cfg(test)]
mod tests {
    use super::{drop_containing, drop_missing};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("invoice", DataType::Utf8),
            Field::new("amount", DataType::Float64),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Utf8("489434".to_string()), Value::Float64(2.0)],
            vec![Value::Int64(2), Value::Utf8("C489449".to_string()), Value::Float64(f64::NAN)],
            vec![Value::Null, Value::Utf8("489435".to_string()), Value::Float64(4.0)],
            vec![Value::Int64(4), Value::Null, Value::Float64(8.0)],
            vec![Value::Int64(5), Value::Utf8("c489450".to_string()), Value::Float64(1.0)],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn filter_rows_by_numeric_predicate() {
        let ds = sample_dataset();
        let id_idx = ds.schema.index_of("id").unwrap();

        let out = ds.filter_rows(|row| matches!(row.get(id_idx), Some(Value::Int64(v)) if *v > 2));

        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.row_count(), 2);
        // Original unchanged
        assert_eq!(ds.row_count(), 5);
    }

    #[test]
    fn drop_missing_removes_null_and_nan_rows() {
        let ds = sample_dataset();
        let out = drop_missing(&ds, &["id", "invoice", "amount"]).unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::Int64(1), Value::Int64(5)]);
    }

    #[test]
    fn drop_missing_only_checks_listed_columns() {
        let ds = sample_dataset();
        let out = drop_missing(&ds, &["id"]).unwrap();
        assert_eq!(out.row_count(), 4);
    }

    #[test]
    fn drop_missing_errors_on_unknown_column() {
        let ds = sample_dataset();
        let err = drop_missing(&ds, &["nope"]).unwrap_err();
        assert!(err.to_string().contains("missing required column 'nope'"));
    }

    #[test]
    fn drop_containing_is_case_sensitive_and_keeps_nulls() {
        let ds = sample_dataset();
        let out = drop_containing(&ds, "invoice", "C").unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            ids,
            vec![Value::Int64(1), Value::Null, Value::Int64(4), Value::Int64(5)]
        );
    }

    #[test]
    fn filters_can_return_empty_dataset() {
        let ds = sample_dataset();
        let out = ds.filter_rows(|_| false);
        assert_eq!(out.schema, ds.schema);
        assert!(out.rows.is_empty());
    }
}
