//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{RecordDbOptions, RecordDbOptionsBuilder, StatementMode};
pub use crate::db::{ExecutionHandle, RecordDb};
pub use crate::descriptor::{TableDescriptor, describe};
pub use crate::error::{SqlRecordDbError, TxStage};
pub use crate::executor::{ExecOutcome, SqlExecutor};
pub use crate::record;
pub use crate::record::{Record, RecordSchema};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::statement::Statement;
pub use crate::types::{RowValues, SqlField};
