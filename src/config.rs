use std::time::Duration;

use rusqlite::Connection;

use crate::db::RecordDb;
use crate::error::SqlRecordDbError;

/// How statement parameters reach SQLite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementMode {
    /// Values are bound to `?N` placeholders.
    #[default]
    Bound,
    /// Values are spliced into the SQL text as literals. Text is not escaped, so this
    /// mode is open to SQL injection; only use it with trusted values.
    ///
    /// Text is rendered in double quotes, which SQLite resolves as a column name before
    /// falling back to a string. A text value that equals a column name of the table
    /// (`"id"`, `"title"`) is read as that column, not as text.
    Interpolated,
}

/// Options for opening a [`RecordDb`].
#[derive(Debug, Clone)]
pub struct RecordDbOptions {
    pub db_path: String,
    pub debug: bool,
    pub statement_mode: StatementMode,
    pub busy_timeout: Option<Duration>,
    /// Switch file databases to WAL journaling. Ignored for in-memory databases.
    pub wal: bool,
}

impl RecordDbOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            debug: false,
            statement_mode: StatementMode::Bound,
            busy_timeout: None,
            wal: true,
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> RecordDbOptionsBuilder {
        RecordDbOptionsBuilder::new(db_path)
    }

    fn is_memory(&self) -> bool {
        self.db_path == ":memory:" || self.db_path.is_empty() || self.db_path.contains("mode=memory")
    }
}

/// Fluent builder for [`RecordDbOptions`].
#[derive(Debug, Clone)]
pub struct RecordDbOptionsBuilder {
    opts: RecordDbOptions,
}

impl RecordDbOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: RecordDbOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.opts.debug = debug;
        self
    }

    #[must_use]
    pub fn statement_mode(mut self, mode: StatementMode) -> Self {
        self.opts.statement_mode = mode;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> RecordDbOptions {
        self.opts
    }

    /// Open the database described by these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ConnectionError` if the database cannot be opened, or
    /// `ConfigError` if a pragma cannot be applied.
    pub fn build(self) -> Result<RecordDb<'static>, SqlRecordDbError> {
        RecordDb::open(self.finish())
    }
}

impl RecordDb<'static> {
    /// Open a connection and apply `opts`.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ConnectionError` if the database cannot be opened, or
    /// `ConfigError` if a pragma cannot be applied.
    pub fn open(opts: RecordDbOptions) -> Result<Self, SqlRecordDbError> {
        if opts.db_path.trim().is_empty() {
            return Err(SqlRecordDbError::ConfigError(
                "db_path must name a file or :memory:".into(),
            ));
        }

        let conn = Connection::open(&opts.db_path).map_err(|e| {
            SqlRecordDbError::ConnectionError(format!(
                "failed to open SQLite database {}: {e}",
                opts.db_path
            ))
        })?;

        if let Some(timeout) = opts.busy_timeout {
            conn.busy_timeout(timeout).map_err(|e| {
                SqlRecordDbError::ConfigError(format!("failed to set busy_timeout: {e}"))
            })?;
        }

        if opts.wal && !opts.is_memory() {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(|e| {
                    SqlRecordDbError::ConfigError(format!("failed to enable WAL journaling: {e}"))
                })?;
            tracing::debug!(journal_mode = %mode, "journal mode applied");
        }

        tracing::debug!(
            db_path = %opts.db_path,
            debug = opts.debug,
            mode = ?opts.statement_mode,
            "record database opened"
        );
        Ok(RecordDb::new(conn, opts.debug).with_mode(opts.statement_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let opts = RecordDbOptions::builder(":memory:").finish();
        assert!(!opts.debug);
        assert!(opts.wal);
        assert_eq!(opts.statement_mode, StatementMode::Bound);
        assert_eq!(opts.busy_timeout, None);
        assert!(opts.is_memory());
    }

    #[test]
    fn blank_path_is_a_config_error() {
        assert!(matches!(
            RecordDb::open(RecordDbOptions::new("  ")),
            Err(SqlRecordDbError::ConfigError(_))
        ));
    }

    #[test]
    fn in_memory_database_opens_with_options() {
        let db = RecordDbOptions::builder(":memory:")
            .debug(true)
            .statement_mode(StatementMode::Interpolated)
            .busy_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        assert!(db.debug());
        assert_eq!(db.mode(), StatementMode::Interpolated);
    }
}
