use rusqlite::Connection;

use super::params::Params;
use super::query::build_result_set;
use crate::error::SqlRecordDbError;
use crate::executor::{ExecOutcome, SqlExecutor};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Also serves `rusqlite::Transaction`, which derefs to its connection.
impl SqlExecutor for Connection {
    fn execute(&self, sql: &str, params: &[RowValues]) -> Result<ExecOutcome, SqlRecordDbError> {
        let params = Params::convert(params);
        let mut stmt = self.prepare(sql)?;
        let rows_affected = stmt.execute(&params.as_refs()[..])?;
        let last_insert_id = (rows_affected > 0).then(|| self.last_insert_rowid());
        tracing::debug!(rows_affected, ?last_insert_id, "sqlite execute finished");
        Ok(ExecOutcome {
            rows_affected,
            last_insert_id,
        })
    }

    fn query_rows(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, SqlRecordDbError> {
        let params = Params::convert(params);
        let mut stmt = self.prepare(sql)?;
        let result_set = build_result_set(&mut stmt, &params)?;
        tracing::debug!(rows = result_set.len(), "sqlite query finished");
        Ok(result_set)
    }
}
