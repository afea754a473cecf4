//! JSON map conversion for serde types.
//!
//! These sit beside the record engine for callers that move records through
//! loosely-typed layers (templates, request payloads) as `serde_json` maps.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SqlRecordDbError;

/// Serialize `value` into a JSON object map.
///
/// # Errors
///
/// Returns `SqlRecordDbError::SerializationError` if serialization fails, or
/// `ShapeError` if `value` does not serialize to a JSON object.
pub fn struct_to_map<T: Serialize>(value: &T) -> Result<Map<String, Value>, SqlRecordDbError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(SqlRecordDbError::ShapeError(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserialize a JSON object map into `T`.
///
/// # Errors
///
/// Returns `SqlRecordDbError::SerializationError` if the map does not fit `T`.
pub fn map_to_struct<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, SqlRecordDbError> {
    Ok(serde_json::from_value(Value::Object(map))?)
}
