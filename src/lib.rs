//! Persist plain Rust structs to SQLite without per-type SQL.
//!
//! A record type declares its fields once with [`record!`]. From that declaration the
//! crate derives the table name, primary key and column list, generates
//! `SELECT`/`INSERT`/`UPDATE`/`DELETE` statements, and scans result rows back into
//! caller-owned lists and maps. [`RecordDb::with_transaction`] wraps a unit of work with
//! commit, rollback and panic handling.
//!
//! ```rust
//! use sql_record::prelude::*;
//!
//! record! {
//!     #[derive(Debug, Default, Clone, PartialEq)]
//!     pub struct Article {
//!         pub id: i64,
//!         pub title: String,
//!     }
//! }
//!
//! # fn main() -> Result<(), SqlRecordDbError> {
//! let db = RecordDbOptions::builder(":memory:").build()?;
//! db.connection()
//!     .execute_batch("CREATE TABLE article (id INTEGER PRIMARY KEY, title TEXT NOT NULL);")?;
//!
//! db.with_transaction(|tx| {
//!     tx.create(&mut Article { id: 0, title: "a".into() })?;
//!     tx.create(&mut Article { id: 0, title: "b".into() })?;
//!     Ok::<_, SqlRecordDbError>(())
//! })?;
//!
//! let mut all: Vec<Article> = Vec::new();
//! db.query_by_clause("1=1 ORDER BY id", &mut all)?;
//! assert_eq!(all.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod casing;
pub mod config;
pub mod conversion;
pub mod db;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod literal;
pub mod materialize;
pub mod prelude;
pub mod record;
pub mod results;
pub mod sqlite;
pub mod statement;
pub mod types;

pub use config::{RecordDbOptions, StatementMode};
pub use db::{ExecutionHandle, RecordDb};
pub use error::SqlRecordDbError;
pub use record::Record;
pub use results::{CustomDbRow, ResultSet};
pub use types::{RowValues, SqlField};
