use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlRecordDbError;

/// Formats accepted when a text cell is read back as a timestamp.
const TIMESTAMP_PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Values held by a record field, bound as a statement parameter, or read from a result
/// cell.
///
/// ```rust
/// use sql_record::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit); every signed integer width maps here
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for the zero value of the field's kind: `0`, `""`, `false`, an empty blob
    /// or NULL. A zero primary key means "not yet assigned".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            RowValues::Int(i) => *i == 0,
            RowValues::Float(f) => *f == 0.0,
            RowValues::Text(s) => s.is_empty(),
            RowValues::Bool(b) => !*b,
            RowValues::Blob(bytes) => bytes.is_empty(),
            RowValues::Null => true,
            RowValues::Timestamp(_) | RowValues::JSON(_) => false,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            let s = s.trim();
            return TIMESTAMP_PARSE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok());
        }
        None
    }

    /// Textual form of a cell for the untyped raw-query helpers. NULL becomes `""`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Text(s) => s.clone(),
            RowValues::Bool(b) => b.to_string(),
            RowValues::Timestamp(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            RowValues::Null => String::new(),
            RowValues::JSON(json) => json.to_string(),
            RowValues::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "integer",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "boolean",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "NULL",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }
}

/// A field type that can live in a record column.
///
/// `to_row_value` and `from_row_value` must round-trip: the materializer rebuilds fields
/// from exactly the values `to_row_value` produced or the store handed back.
pub trait SqlField: Sized {
    fn to_row_value(&self) -> RowValues;

    /// Decode a result cell into this field type.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` when the cell's kind cannot become `Self`.
    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError>;
}

fn mismatch(expected: &str, value: &RowValues) -> SqlRecordDbError {
    SqlRecordDbError::ShapeError(format!(
        "cannot scan {} value {value:?} into {expected}",
        value.kind()
    ))
}

macro_rules! impl_sql_field_signed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SqlField for $ty {
                fn to_row_value(&self) -> RowValues {
                    RowValues::Int(i64::from(*self))
                }

                fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
                    match value {
                        RowValues::Int(i) => <$ty>::try_from(*i).map_err(|_| {
                            SqlRecordDbError::ShapeError(format!(
                                "integer {i} is out of range for {}",
                                stringify!($ty)
                            ))
                        }),
                        RowValues::Bool(b) => Ok(<$ty>::from(*b)),
                        RowValues::Text(s) => s
                            .trim()
                            .parse::<$ty>()
                            .map_err(|_| mismatch(stringify!($ty), value)),
                        _ => Err(mismatch(stringify!($ty), value)),
                    }
                }
            }
        )*
    };
}

impl_sql_field_signed!(i8, i16, i32, i64);

impl SqlField for String {
    fn to_row_value(&self) -> RowValues {
        RowValues::Text(self.clone())
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        match value {
            RowValues::Null => Err(mismatch("String", value)),
            other => Ok(other.to_text()),
        }
    }
}

impl SqlField for bool {
    fn to_row_value(&self) -> RowValues {
        RowValues::Bool(*self)
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        if let Some(b) = value.as_bool() {
            return Ok(*b);
        }
        match value.as_text().map(str::trim) {
            Some("true" | "TRUE" | "1") => Ok(true),
            Some("false" | "FALSE" | "0") => Ok(false),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl SqlField for f64 {
    fn to_row_value(&self) -> RowValues {
        RowValues::Float(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        match value {
            RowValues::Float(f) => Ok(*f),
            RowValues::Int(i) => Ok(*i as f64),
            RowValues::Text(s) => s.trim().parse().map_err(|_| mismatch("f64", value)),
            _ => Err(mismatch("f64", value)),
        }
    }
}

impl SqlField for NaiveDateTime {
    fn to_row_value(&self) -> RowValues {
        RowValues::Timestamp(*self)
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("NaiveDateTime", value))
    }
}

impl SqlField for Vec<u8> {
    fn to_row_value(&self) -> RowValues {
        RowValues::Blob(self.clone())
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        match value {
            RowValues::Blob(bytes) => Ok(bytes.clone()),
            RowValues::Text(s) => Ok(s.clone().into_bytes()),
            _ => Err(mismatch("Vec<u8>", value)),
        }
    }
}

impl SqlField for JsonValue {
    fn to_row_value(&self) -> RowValues {
        RowValues::JSON(self.clone())
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        match value {
            RowValues::JSON(json) => Ok(json.clone()),
            RowValues::Text(s) => Ok(serde_json::from_str(s)?),
            RowValues::Null => Ok(JsonValue::Null),
            _ => Err(mismatch("serde_json::Value", value)),
        }
    }
}

/// Nullable columns; `Option<NaiveDateTime>` is the nullable timestamp.
impl<T: SqlField> SqlField for Option<T> {
    fn to_row_value(&self) -> RowValues {
        match self {
            Some(value) => value.to_row_value(),
            None => RowValues::Null,
        }
    }

    fn from_row_value(value: &RowValues) -> Result<Self, SqlRecordDbError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}
