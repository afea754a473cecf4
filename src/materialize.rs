//! Turning result rows into record instances inside caller-owned containers.
//!
//! Containers are only ever appended to or inserted into. Each row becomes
//! `T::default()` followed by [`Record::scan_row`], so skipped fields keep their default.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::SqlRecordDbError;
use crate::record::Record;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::SqlField;

fn check_width<T: Record>(result_set: &ResultSet) -> Result<(), SqlRecordDbError> {
    let schema = T::schema()?;
    let columns = result_set.column_count();
    if columns == schema.len() {
        Ok(())
    } else {
        Err(SqlRecordDbError::ShapeError(format!(
            "result has {columns} column(s) but `{}` has {}",
            schema.type_name(),
            schema.len()
        )))
    }
}

fn build<T: Record>(row: &CustomDbRow) -> Result<T, SqlRecordDbError> {
    let mut record = T::default();
    record.scan_row(row.values())?;
    Ok(record)
}

fn build_all<T: Record>(result_set: &ResultSet) -> Result<Vec<T>, SqlRecordDbError> {
    check_width::<T>(result_set)?;
    result_set.iter().map(build::<T>).collect()
}

/// Append one record per row, in row order.
///
/// # Errors
///
/// Returns `SqlRecordDbError::ShapeError` if the rows do not fit `T`. `out` is left
/// untouched on error.
pub fn append_values<T: Record>(
    result_set: &ResultSet,
    out: &mut Vec<T>,
) -> Result<(), SqlRecordDbError> {
    out.extend(build_all::<T>(result_set)?);
    Ok(())
}

/// As [`append_values`], holding each record in a `Box`.
///
/// # Errors
///
/// Returns `SqlRecordDbError::ShapeError` if the rows do not fit `T`. `out` is left
/// untouched on error.
pub fn append_refs<T: Record>(
    result_set: &ResultSet,
    out: &mut Vec<Box<T>>,
) -> Result<(), SqlRecordDbError> {
    out.extend(build_all::<T>(result_set)?.into_iter().map(Box::new));
    Ok(())
}

/// Insert one record per row keyed by its primary key. A later row with the same key
/// replaces the earlier one.
///
/// # Errors
///
/// Returns `SqlRecordDbError::ShapeError` if the rows do not fit `T` or a key cell does
/// not decode into `K`. `out` is left untouched on error.
pub fn insert_keyed<T, K, V>(
    result_set: &ResultSet,
    out: &mut HashMap<K, V>,
) -> Result<(), SqlRecordDbError>
where
    T: Record,
    K: SqlField + Eq + Hash,
    V: From<T>,
{
    check_width::<T>(result_set)?;
    let key_index = T::schema()?.primary_key_index();
    let mut entries = Vec::with_capacity(result_set.len());
    for row in result_set {
        let key_cell = row.get_by_index(key_index).ok_or_else(|| {
            SqlRecordDbError::ShapeError(format!("row has no primary key column {key_index}"))
        })?;
        entries.push((K::from_row_value(key_cell)?, V::from(build::<T>(row)?)));
    }
    out.extend(entries);
    Ok(())
}
