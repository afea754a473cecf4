use std::fmt;

use thiserror::Error;

/// Which step of a transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Begin,
    Commit,
    Rollback,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            TxStage::Begin => "begin",
            TxStage::Commit => "commit",
            TxStage::Rollback => "rollback",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
pub enum SqlRecordDbError {
    /// The store rejected or failed to run a statement; passed through unchanged.
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A value's shape does not fit the operation (not a flat record, a row that does
    /// not line up with the record's columns, a cell that cannot become its field).
    #[error("Shape error: {0}")]
    ShapeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction {stage} failed: {source}")]
    TransactionError {
        stage: TxStage,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    SerializationError(#[from] serde_json::Error),
}

impl SqlRecordDbError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SqlRecordDbError::NotFound(_))
    }

    pub(crate) fn transaction(stage: TxStage) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| SqlRecordDbError::TransactionError { stage, source }
    }
}
