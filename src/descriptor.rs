//! Per-call table metadata for one record instance.

use crate::error::SqlRecordDbError;
use crate::literal::{SqlLiteral, encode_literal};
use crate::record::Record;
use crate::types::RowValues;

/// A record's table, key and current column values. `values[i]` belongs to `columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub table_name: String,
    pub primary_key_column: String,
    pub primary_key_index: usize,
    pub columns: Vec<String>,
    pub values: Vec<RowValues>,
}

impl TableDescriptor {
    #[must_use]
    pub fn primary_key_value(&self) -> &RowValues {
        &self.values[self.primary_key_index]
    }

    #[must_use]
    pub fn value_of(&self, column: &str) -> Option<&RowValues> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Column to literal mapping, in column order.
    #[must_use]
    pub fn literals(&self) -> Vec<(&str, SqlLiteral)> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.as_str(), encode_literal(value)))
            .collect()
    }

    /// Columns and values other than the primary key's.
    pub fn non_key_columns(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        let key = self.primary_key_index;
        self.columns
            .iter()
            .zip(&self.values)
            .enumerate()
            .filter(move |(idx, _)| *idx != key)
            .map(|(_, (column, value))| (column.as_str(), value))
    }
}

/// Derive the table descriptor of `record`.
///
/// # Errors
///
/// Returns `SqlRecordDbError::ShapeError` if the record type's mapping is invalid or its
/// field values do not line up with its columns.
pub fn describe<T: Record>(record: &T) -> Result<TableDescriptor, SqlRecordDbError> {
    let schema = T::schema()?;
    let values = record.field_values();
    if values.len() != schema.len() {
        return Err(SqlRecordDbError::ShapeError(format!(
            "`{}` produced {} values for {} columns",
            schema.type_name(),
            values.len(),
            schema.len()
        )));
    }
    Ok(TableDescriptor {
        table_name: schema.table_name().to_string(),
        primary_key_column: schema.primary_key_column().to_string(),
        primary_key_index: schema.primary_key_index(),
        columns: schema.column_names().map(str::to_string).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Author {
        name: String,
    }

    crate::record! {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Article {
            #[column(pk = "id")]
            id: i64,
            title: String,
            body: String,
            published: bool,
            created_at: chrono::NaiveDateTime,
            #[column(skip)]
            author: Author,
        }
    }

    crate::record! {
        #[derive(Debug, Default)]
        struct Counter {
            label: String,
            hits: i64,
        }
    }

    crate::record! {
        #[derive(Debug, Default)]
        struct Twice {
            title: String,
            #[column(column = "title")]
            heading: String,
        }
    }

    fn article() -> Article {
        Article {
            id: 3,
            title: "Hello".into(),
            body: "World".into(),
            published: true,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
            author: Author {
                name: "ignored".into(),
            },
        }
    }

    #[test]
    fn describes_columns_in_declaration_order() {
        let desc = describe(&article()).unwrap();
        assert_eq!(desc.table_name, "article");
        assert_eq!(desc.primary_key_column, "id");
        assert_eq!(
            desc.columns,
            ["id", "title", "body", "published", "created_at"]
        );
        assert_eq!(desc.primary_key_value(), &RowValues::Int(3));
        assert_eq!(desc.value_of("title"), Some(&RowValues::Text("Hello".into())));
        assert_eq!(desc.value_of("author"), None);
    }

    #[test]
    fn literals_follow_column_order() {
        let desc = describe(&article()).unwrap();
        let rendered: Vec<(&str, String)> = desc
            .literals()
            .into_iter()
            .map(|(column, literal)| (column, literal.to_string()))
            .collect();
        assert_eq!(
            rendered,
            [
                ("id", "3".to_string()),
                ("title", "\"Hello\"".to_string()),
                ("body", "\"World\"".to_string()),
                ("published", "true".to_string()),
                ("created_at", "\"2024-05-01 08:00:00\"".to_string()),
            ]
        );
    }

    #[test]
    fn first_field_keys_a_record_without_id() {
        let desc = describe(&Counter {
            label: "home".into(),
            hits: 4,
        })
        .unwrap();
        assert_eq!(desc.primary_key_column, "label");
        let rest: Vec<&str> = desc.non_key_columns().map(|(c, _)| c).collect();
        assert_eq!(rest, ["hits"]);
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        assert!(matches!(
            describe(&Twice::default()),
            Err(SqlRecordDbError::ShapeError(_))
        ));
    }
}
