//! SQL literal rendering.
//!
//! Warning: literals are spliced into statement text without escaping. A text value
//! containing `"` ends the literal early, so interpolated statements are open to SQL
//! injection. The engine binds parameters by default and only goes through
//! [`interpolate`] under `StatementMode::Interpolated` (and for debug echo).
//!
//! Text literals are double-quoted. SQLite resolves a double-quoted token as an
//! identifier first and only falls back to a string when no column has that name, so a
//! text value equal to a column name in scope (`"id"` in a statement on a table with an
//! `id` column) reads or writes that column instead of the text.

mod scanner;

use std::fmt;
use std::fmt::Write;

use crate::error::SqlRecordDbError;
use crate::types::RowValues;

use scanner::{State, scan_digits};

/// Timestamp layout used inside literals: 24-hour, zero-padded, no fraction or zone.
pub const LITERAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The literal form of one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlLiteral {
    /// Text ready to splice into a statement.
    Rendered(String),
    /// `NULL`, from an empty optional field.
    Null,
    /// The value's kind has no literal form (floats, blobs, JSON). Displays as `""`.
    Unsupported,
}

impl SqlLiteral {
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, SqlLiteral::Unsupported)
    }
}

impl fmt::Display for SqlLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlLiteral::Rendered(text) => f.write_str(text),
            SqlLiteral::Null => f.write_str("NULL"),
            SqlLiteral::Unsupported => Ok(()),
        }
    }
}

/// Render a value as a SQL literal.
///
/// | value | literal |
/// |---|---|
/// | `Int` | decimal digits |
/// | `Text` | `"` + value verbatim + `"` |
/// | `Bool` | `true` / `false` |
/// | `Timestamp` | `"YYYY-MM-DD HH:MM:SS"` |
/// | `Null` | `NULL` |
/// | anything else | [`SqlLiteral::Unsupported`] |
///
/// ```rust
/// use sql_record::literal::{SqlLiteral, encode_literal};
/// use sql_record::RowValues;
///
/// assert_eq!(encode_literal(&RowValues::Int(-42)).to_string(), "-42");
/// assert_eq!(encode_literal(&RowValues::Text("x".into())).to_string(), "\"x\"");
/// assert_eq!(encode_literal(&RowValues::Float(1.5)), SqlLiteral::Unsupported);
/// ```
#[must_use]
pub fn encode_literal(value: &RowValues) -> SqlLiteral {
    match value {
        RowValues::Int(i) => SqlLiteral::Rendered(i.to_string()),
        RowValues::Text(s) => SqlLiteral::Rendered(format!("\"{s}\"")),
        RowValues::Bool(b) => SqlLiteral::Rendered(b.to_string()),
        RowValues::Timestamp(dt) => {
            SqlLiteral::Rendered(format!("\"{}\"", dt.format(LITERAL_TIMESTAMP_FORMAT)))
        }
        RowValues::Null => SqlLiteral::Null,
        RowValues::Float(_) | RowValues::JSON(_) | RowValues::Blob(_) => {
            tracing::warn!(?value, "value kind has no SQL literal form");
            SqlLiteral::Unsupported
        }
    }
}

/// Replace `?N` (and bare `?`) placeholders outside quotes and comments with the literal
/// form of the matching parameter.
///
/// # Errors
///
/// Returns `SqlRecordDbError::ShapeError` if a placeholder has no parameter or a
/// parameter has no literal form.
pub fn interpolate(sql: &str, params: &[RowValues]) -> Result<String, SqlRecordDbError> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut state = State::Normal;
    let mut copied_to = 0;
    let mut next_position = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if state == State::Normal && bytes[idx] == b'?' {
            let (end, position) = match scan_digits(bytes, idx + 1) {
                Some((end, digits)) => {
                    let number: usize = digits.parse().map_err(|_| {
                        SqlRecordDbError::ShapeError(format!("bad placeholder ?{digits}"))
                    })?;
                    let position = number.checked_sub(1).ok_or_else(|| {
                        SqlRecordDbError::ShapeError("placeholder ?0 is not valid".into())
                    })?;
                    (end, position)
                }
                None => (idx + 1, next_position),
            };
            let value = params.get(position).ok_or_else(|| {
                SqlRecordDbError::ShapeError(format!(
                    "placeholder ?{} has no parameter ({} supplied)",
                    position + 1,
                    params.len()
                ))
            })?;
            let literal = encode_literal(value);
            if !literal.is_supported() {
                return Err(SqlRecordDbError::ShapeError(format!(
                    "parameter ?{} ({value:?}) has no SQL literal form",
                    position + 1
                )));
            }
            out.push_str(&sql[copied_to..idx]);
            let _ = write!(out, "{literal}");
            next_position = position + 1;
            copied_to = end;
            idx = end;
            continue;
        }
        let (next, extra) = state.step(bytes, idx);
        state = next;
        idx += 1 + extra;
    }

    out.push_str(&sql[copied_to..]);
    Ok(out)
}
