//! SQL text generation from record metadata.
//!
//! Statements carry `?N` placeholders and their parameters separately. Column lists,
//! SET lists and WHERE conjunctions all follow schema column order.

use std::fmt::Write;

use crate::descriptor::TableDescriptor;
use crate::error::SqlRecordDbError;
use crate::literal::interpolate;
use crate::record::RecordSchema;
use crate::types::RowValues;

/// SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<RowValues>,
}

impl Statement {
    /// A statement with no parameters, such as caller-supplied raw SQL.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[RowValues] {
        &self.params
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Vec<RowValues>) {
        (self.sql, self.params)
    }

    /// The statement with every placeholder replaced by its literal.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if a parameter has no literal form.
    pub fn interpolated(&self) -> Result<String, SqlRecordDbError> {
        interpolate(&self.sql, &self.params)
    }

    /// Literal form when every parameter has one, else the SQL followed by its params.
    #[must_use]
    pub fn display_for_log(&self) -> String {
        if self.params.is_empty() {
            return self.sql.clone();
        }
        self.interpolated()
            .unwrap_or_else(|_| format!("{} -- params: {:?}", self.sql, self.params))
    }

    /// `SELECT <cols> FROM <table> WHERE <pk>=?1`
    #[must_use]
    pub fn select_by_key(desc: &TableDescriptor) -> Self {
        let mut sql = select_prefix(&desc.table_name, desc.columns.iter().map(String::as_str));
        let _ = write!(sql, " WHERE {}=?1", desc.primary_key_column);
        Self {
            sql,
            params: vec![desc.primary_key_value().clone()],
        }
    }

    /// SELECT filtered on every column of the template, zero values included.
    #[must_use]
    pub fn select_matching(desc: &TableDescriptor) -> Self {
        let mut sql = select_prefix(&desc.table_name, desc.columns.iter().map(String::as_str));
        sql.push_str(" WHERE ");
        push_assignments(&mut sql, desc.columns.iter().map(String::as_str), 1, " AND ");
        Self {
            sql,
            params: desc.values.clone(),
        }
    }

    /// SELECT with a caller-written condition appended verbatim after `WHERE`. A blank
    /// condition selects every row.
    #[must_use]
    pub fn select_where(schema: &RecordSchema, clause: &str) -> Self {
        let mut sql = select_prefix(schema.table_name(), schema.column_names());
        let clause = clause.trim();
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        Self::raw(sql)
    }

    /// `INSERT INTO <table> (<cols>) VALUES (?1, ...)`. An integer key of `0` is bound
    /// as NULL so the store assigns the identity; every other key is bound as is.
    #[must_use]
    pub fn insert(desc: &TableDescriptor) -> Self {
        let mut sql = format!("INSERT INTO {} (", desc.table_name);
        sql.push_str(&desc.columns.join(", "));
        sql.push_str(") VALUES (");
        for position in 1..=desc.columns.len() {
            if position > 1 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "?{position}");
        }
        sql.push(')');

        let mut params = desc.values.clone();
        if params[desc.primary_key_index] == RowValues::Int(0) {
            params[desc.primary_key_index] = RowValues::Null;
        }
        Self { sql, params }
    }

    /// `UPDATE <table> SET <col>=?1, ... WHERE <pk>=?n`, never setting the key column.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ValidationError` if the key is zero or the record has
    /// no column besides its key.
    pub fn update(desc: &TableDescriptor) -> Result<Self, SqlRecordDbError> {
        let key = desc.primary_key_value();
        if key.is_zero() {
            return Err(SqlRecordDbError::ValidationError(format!(
                "cannot update `{}` without a primary key value",
                desc.table_name
            )));
        }
        let (columns, mut params): (Vec<&str>, Vec<RowValues>) = desc
            .non_key_columns()
            .map(|(column, value)| (column, value.clone()))
            .unzip();
        if columns.is_empty() {
            return Err(SqlRecordDbError::ValidationError(format!(
                "`{}` has no columns to update besides its key",
                desc.table_name
            )));
        }

        let mut sql = format!("UPDATE {} SET ", desc.table_name);
        push_assignments(&mut sql, columns.iter().copied(), 1, ", ");
        let _ = write!(
            sql,
            " WHERE {}=?{}",
            desc.primary_key_column,
            columns.len() + 1
        );
        params.push(key.clone());
        Ok(Self { sql, params })
    }

    /// `DELETE FROM <table> WHERE <pk>=?1`
    #[must_use]
    pub fn delete(desc: &TableDescriptor) -> Self {
        Self {
            sql: format!(
                "DELETE FROM {} WHERE {}=?1",
                desc.table_name, desc.primary_key_column
            ),
            params: vec![desc.primary_key_value().clone()],
        }
    }
}

fn select_prefix<'a>(table: &str, columns: impl Iterator<Item = &'a str>) -> String {
    let columns: Vec<&str> = columns.collect();
    format!("SELECT {} FROM {table}", columns.join(", "))
}

fn push_assignments<'a>(
    sql: &mut String,
    columns: impl Iterator<Item = &'a str>,
    first_position: usize,
    separator: &str,
) {
    for (offset, column) in columns.enumerate() {
        if offset > 0 {
            sql.push_str(separator);
        }
        let _ = write!(sql, "{column}=?{}", first_position + offset);
    }
}
