use rusqlite::types::Value;

use crate::types::RowValues;

/// Layout of timestamps stored as text; `RowValues::as_timestamp` reads it back.
pub const SQLITE_TIMESTAMP_FORMAT: &str = "%F %T%.f";

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format(SQLITE_TIMESTAMP_FORMAT).to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bound parameters for one statement.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Params(params.iter().map(row_value_to_sqlite_value).collect())
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn booleans_and_timestamps_use_sqlite_storage_classes() {
        let ts = NaiveDate::from_ymd_opt(2023, 11, 2)
            .and_then(|d| d.and_hms_milli_opt(9, 15, 0, 125))
            .unwrap();
        let params = Params::convert(&[
            RowValues::Bool(true),
            RowValues::Timestamp(ts),
            RowValues::JSON(serde_json::json!([1, 2])),
        ]);
        assert_eq!(
            &params.0[..],
            &[
                Value::Integer(1),
                Value::Text("2023-11-02 09:15:00.125".into()),
                Value::Text("[1,2]".into()),
            ]
        );
    }
}
