//! The record engine: CRUD, queries into caller containers, raw helpers and
//! transactions over one execution handle.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};

use rusqlite::{Connection, Transaction};

use crate::config::StatementMode;
use crate::descriptor::describe;
use crate::error::{SqlRecordDbError, TxStage};
use crate::executor::{ExecOutcome, SqlExecutor};
use crate::materialize::{append_refs, append_values, insert_keyed};
use crate::record::Record;
use crate::results::{CustomDbRow, ResultSet};
use crate::statement::Statement;
use crate::types::{RowValues, SqlField};

/// Where statements run. Fixed for the life of a [`RecordDb`].
#[derive(Debug)]
pub enum ExecutionHandle<'conn> {
    /// The engine owns the connection.
    Direct(Connection),
    /// The engine is scoped to an open transaction.
    InTransaction(&'conn Transaction<'conn>),
}

impl ExecutionHandle<'_> {
    #[must_use]
    pub fn connection(&self) -> &Connection {
        match self {
            ExecutionHandle::Direct(conn) => conn,
            ExecutionHandle::InTransaction(tx) => Deref::deref(*tx),
        }
    }

    #[must_use]
    pub fn is_transaction(&self) -> bool {
        matches!(self, ExecutionHandle::InTransaction(_))
    }
}

/// Persists [`Record`] types through SQLite.
///
/// ```rust
/// use sql_record::prelude::*;
///
/// record! {
///     #[derive(Debug, Default, Clone, PartialEq)]
///     pub struct Article {
///         pub id: i64,
///         pub title: String,
///     }
/// }
///
/// # fn main() -> Result<(), SqlRecordDbError> {
/// let db = RecordDb::new(rusqlite::Connection::open_in_memory()?, false);
/// db.connection()
///     .execute_batch("CREATE TABLE article (id INTEGER PRIMARY KEY, title TEXT NOT NULL);")?;
///
/// let mut article = Article { id: 0, title: "x".into() };
/// db.create(&mut article)?;
/// assert_eq!(article.id, 1);
///
/// let mut found = Article { id: 1, ..Default::default() };
/// db.find(&mut found)?;
/// assert_eq!(found.title, "x");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RecordDb<'conn> {
    handle: ExecutionHandle<'conn>,
    debug: bool,
    mode: StatementMode,
}

impl RecordDb<'static> {
    /// Wrap an open connection. With `debug` on, every statement is logged at `info`
    /// level (target `sql_record::statement`) before it runs.
    #[must_use]
    pub fn new(conn: Connection, debug: bool) -> Self {
        Self {
            handle: ExecutionHandle::Direct(conn),
            debug,
            mode: StatementMode::default(),
        }
    }
}

impl<'conn> RecordDb<'conn> {
    /// Switch between bound parameters and literal interpolation.
    #[must_use]
    pub fn with_mode(mut self, mode: StatementMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        self.handle.connection()
    }

    #[must_use]
    pub fn handle(&self) -> &ExecutionHandle<'conn> {
        &self.handle
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn mode(&self) -> StatementMode {
        self.mode
    }

    /// Close an owned connection. A transaction-scoped engine has nothing to close.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::SqliteError` if SQLite refuses to close.
    pub fn close(self) -> Result<(), SqlRecordDbError> {
        match self.handle {
            ExecutionHandle::Direct(conn) => conn.close().map_err(|(_, err)| err.into()),
            ExecutionHandle::InTransaction(_) => Ok(()),
        }
    }

    fn render(
        &self,
        stmt: Statement,
        kind: &'static str,
    ) -> Result<(String, Vec<RowValues>), SqlRecordDbError> {
        tracing::debug!(
            kind,
            mode = ?self.mode,
            params = stmt.params().len(),
            in_transaction = self.handle.is_transaction(),
            "running statement"
        );
        if self.debug {
            tracing::info!(target: "sql_record::statement", kind, sql = %stmt.display_for_log());
        }
        match self.mode {
            StatementMode::Bound => Ok(stmt.into_parts()),
            StatementMode::Interpolated => Ok((stmt.interpolated()?, Vec::new())),
        }
    }

    fn run_execute(
        &self,
        stmt: Statement,
        kind: &'static str,
    ) -> Result<ExecOutcome, SqlRecordDbError> {
        let (sql, params) = self.render(stmt, kind)?;
        SqlExecutor::execute(self.connection(), &sql, &params)
    }

    fn run_query(&self, stmt: Statement, kind: &'static str) -> Result<ResultSet, SqlRecordDbError> {
        let (sql, params) = self.render(stmt, kind)?;
        self.connection().query_rows(&sql, &params)
    }

    fn run_query_one(
        &self,
        stmt: Statement,
        kind: &'static str,
    ) -> Result<CustomDbRow, SqlRecordDbError> {
        let (sql, params) = self.render(stmt, kind)?;
        self.connection().query_one_row(&sql, &params)
    }

    /// Load the row whose key equals `record`'s key into `record`. Skipped fields are
    /// left as they are.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::NotFound` when no row has the key, `ShapeError` when
    /// the row does not fit the record, or the store's error.
    pub fn find<T: Record>(&self, record: &mut T) -> Result<(), SqlRecordDbError> {
        let desc = describe(&*record)?;
        let row = self
            .run_query_one(Statement::select_by_key(&desc), "find")
            .map_err(|err| match err {
                SqlRecordDbError::NotFound(_) => SqlRecordDbError::NotFound(format!(
                    "no `{}` row with {}={:?}",
                    desc.table_name,
                    desc.primary_key_column,
                    desc.primary_key_value()
                )),
                other => other,
            })?;
        record.scan_row(row.values())
    }

    /// Insert `record`. When its key is an unassigned integer (`0` or `None`), the
    /// identity SQLite assigns is written back into the key field.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ExecutionError` if no row was inserted, or the
    /// store's error.
    pub fn create<T: Record>(&self, record: &mut T) -> Result<(), SqlRecordDbError> {
        let desc = describe(&*record)?;
        let assign_identity = matches!(
            desc.primary_key_value(),
            RowValues::Int(0) | RowValues::Null
        );
        let outcome = self.run_execute(Statement::insert(&desc), "create")?;
        let id = outcome.last_insert_id.ok_or_else(|| {
            SqlRecordDbError::ExecutionError(format!(
                "insert into `{}` produced no row identity",
                desc.table_name
            ))
        })?;
        if assign_identity {
            record.set_primary_key(RowValues::Int(id))?;
        }
        Ok(())
    }

    /// Write every non-key column of `record` to the row with its key. Returns the
    /// number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ValidationError` if the key is zero or the record has
    /// no non-key column, or the store's error.
    pub fn update<T: Record>(&self, record: &T) -> Result<usize, SqlRecordDbError> {
        let desc = describe(record)?;
        let outcome = self.run_execute(Statement::update(&desc)?, "update")?;
        Ok(outcome.rows_affected)
    }

    /// Delete the row with `record`'s key. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn delete<T: Record>(&self, record: &T) -> Result<usize, SqlRecordDbError> {
        let desc = describe(record)?;
        let outcome = self.run_execute(Statement::delete(&desc), "delete")?;
        Ok(outcome.rows_affected)
    }

    /// Append every row equal to `template` on all of its columns.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if the rows do not fit `T`, or the store's
    /// error.
    pub fn query<T: Record>(&self, template: &T, out: &mut Vec<T>) -> Result<(), SqlRecordDbError> {
        let rows = self.run_query(Statement::select_matching(&describe(template)?), "query")?;
        append_values(&rows, out)
    }

    /// [`RecordDb::query`] into a list of boxes.
    ///
    /// # Errors
    ///
    /// As [`RecordDb::query`].
    pub fn query_refs<T: Record>(
        &self,
        template: &T,
        out: &mut Vec<Box<T>>,
    ) -> Result<(), SqlRecordDbError> {
        let rows = self.run_query(Statement::select_matching(&describe(template)?), "query")?;
        append_refs(&rows, out)
    }

    /// [`RecordDb::query`] into a map keyed by primary key.
    ///
    /// # Errors
    ///
    /// As [`RecordDb::query`], plus `ShapeError` if a key does not decode into `K`.
    pub fn query_into_map<T, K>(
        &self,
        template: &T,
        out: &mut HashMap<K, T>,
    ) -> Result<(), SqlRecordDbError>
    where
        T: Record,
        K: SqlField + Eq + Hash,
    {
        let rows = self.run_query(Statement::select_matching(&describe(template)?), "query")?;
        insert_keyed::<T, K, T>(&rows, out)
    }

    /// Append rows matching `where_clause`, which is copied verbatim after `WHERE`. A
    /// blank clause selects every row.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if the rows do not fit `T`, or the store's
    /// error.
    pub fn query_by_clause<T: Record>(
        &self,
        where_clause: &str,
        out: &mut Vec<T>,
    ) -> Result<(), SqlRecordDbError> {
        let stmt = Statement::select_where(T::schema()?, where_clause);
        append_values(&self.run_query(stmt, "query_by_clause")?, out)
    }

    /// # Errors
    ///
    /// As [`RecordDb::query_by_clause`].
    pub fn query_by_clause_refs<T: Record>(
        &self,
        where_clause: &str,
        out: &mut Vec<Box<T>>,
    ) -> Result<(), SqlRecordDbError> {
        let stmt = Statement::select_where(T::schema()?, where_clause);
        append_refs(&self.run_query(stmt, "query_by_clause")?, out)
    }

    /// # Errors
    ///
    /// As [`RecordDb::query_by_clause`], plus `ShapeError` if a key does not decode
    /// into `K`.
    pub fn query_by_clause_into_map<T, K>(
        &self,
        where_clause: &str,
        out: &mut HashMap<K, T>,
    ) -> Result<(), SqlRecordDbError>
    where
        T: Record,
        K: SqlField + Eq + Hash,
    {
        let stmt = Statement::select_where(T::schema()?, where_clause);
        insert_keyed::<T, K, T>(&self.run_query(stmt, "query_by_clause")?, out)
    }

    /// # Errors
    ///
    /// As [`RecordDb::query_by_clause_into_map`].
    pub fn query_by_clause_into_map_refs<T, K>(
        &self,
        where_clause: &str,
        out: &mut HashMap<K, Box<T>>,
    ) -> Result<(), SqlRecordDbError>
    where
        T: Record,
        K: SqlField + Eq + Hash,
    {
        let stmt = Statement::select_where(T::schema()?, where_clause);
        insert_keyed::<T, K, Box<T>>(&self.run_query(stmt, "query_by_clause")?, out)
    }

    /// Run arbitrary SQL and return each row as column name to text. NULL cells become
    /// empty strings.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn raw_rows(&self, sql: &str) -> Result<Vec<HashMap<String, String>>, SqlRecordDbError> {
        let rows = self.run_query(Statement::raw(sql), "raw_rows")?;
        Ok(rows
            .iter()
            .map(|row| {
                row.named_values()
                    .map(|(name, value)| (name.to_string(), value.to_text()))
                    .collect()
            })
            .collect())
    }

    /// Run arbitrary SQL and return each row's cells as text, in result column order.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn raw_grid(&self, sql: &str) -> Result<Vec<Vec<String>>, SqlRecordDbError> {
        let rows = self.run_query(Statement::raw(sql), "raw_grid")?;
        Ok(rows
            .iter()
            .map(|row| row.values().iter().map(RowValues::to_text).collect())
            .collect())
    }

    /// Run `unit_of_work` inside a transaction on this engine's connection.
    ///
    /// The callback receives an engine scoped to the transaction. `Ok` commits, `Err`
    /// rolls back and is returned as is, and a panic rolls back and then resumes
    /// unwinding. Exactly one of commit or rollback runs. A failure to begin is returned
    /// without calling `unit_of_work`; SQLite has no nested transactions, so calling
    /// this on a transaction-scoped engine fails that way.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::TransactionError` (converted into `E`) if begin or
    /// commit fails, otherwise whatever `unit_of_work` returned.
    pub fn with_transaction<T, E, F>(&self, unit_of_work: F) -> Result<T, E>
    where
        E: From<SqlRecordDbError>,
        F: FnOnce(&RecordDb<'_>) -> Result<T, E>,
    {
        let tx = self
            .connection()
            .unchecked_transaction()
            .map_err(SqlRecordDbError::transaction(TxStage::Begin))?;
        tracing::debug!("transaction started");

        let scoped = RecordDb {
            handle: ExecutionHandle::InTransaction(&tx),
            debug: self.debug,
            mode: self.mode,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| unit_of_work(&scoped)));
        drop(scoped);

        match outcome {
            Ok(Ok(value)) => {
                tx.commit()
                    .map_err(SqlRecordDbError::transaction(TxStage::Commit))?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                roll_back(tx, "unit of work failed");
                Err(err)
            }
            Err(payload) => {
                roll_back(tx, "unit of work panicked");
                panic::resume_unwind(payload)
            }
        }
    }
}

fn roll_back(tx: Transaction<'_>, reason: &'static str) {
    match tx.rollback() {
        Ok(()) => tracing::debug!(reason, "transaction rolled back"),
        Err(err) => tracing::warn!(
            reason,
            error = %SqlRecordDbError::transaction(TxStage::Rollback)(err),
            "transaction rollback failed"
        ),
    }
}
