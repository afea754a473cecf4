use crate::error::SqlRecordDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// What a non-query statement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub rows_affected: usize,
    /// Identity assigned by the store, present only when a row was written.
    pub last_insert_id: Option<i64>,
}

/// The store boundary: run SQL text with positional parameters.
pub trait SqlExecutor {
    /// Run a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::SqliteError` if the store rejects the statement.
    fn execute(&self, sql: &str, params: &[RowValues]) -> Result<ExecOutcome, SqlRecordDbError>;

    /// Run a query and materialize every row.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::SqliteError` if the store rejects the query.
    fn query_rows(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, SqlRecordDbError>;

    /// Run a query expected to produce at least one row and return the first.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::NotFound` when the query produces no rows.
    fn query_one_row(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<CustomDbRow, SqlRecordDbError> {
        self.query_rows(sql, params)?
            .into_rows()
            .next()
            .ok_or_else(|| SqlRecordDbError::NotFound(format!("no row for `{sql}`")))
    }
}
