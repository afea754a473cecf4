// SQLite backend, split into:
// - params: conversion from `RowValues` to rusqlite values
// - query: result extraction and building
// - executor: `SqlExecutor` for rusqlite connections and transactions

pub mod executor;
pub mod params;
pub mod query;

pub use params::{Params, row_value_to_sqlite_value};
pub use query::{build_result_set, sqlite_extract_value_sync};
