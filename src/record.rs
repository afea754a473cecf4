//! Record types and their static column metadata.
//!
//! A record type is a flat struct whose fields map one-to-one onto columns. The mapping
//! is declared once, normally through [`record!`](crate::record!), and cached in a
//! [`RecordSchema`] for the life of the process.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::casing::to_column_case;
use crate::error::SqlRecordDbError;
use crate::types::{RowValues, SqlField};

/// How a field takes part in the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMarker {
    /// The field is the key; the key column is the field's own column.
    Field,
    /// The field is the key and the key column has this name.
    Named(&'static str),
}

/// Per-field mapping overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldOptions {
    pub column: Option<&'static str>,
    pub primary_key: Option<KeyMarker>,
    pub skip: bool,
}

impl FieldOptions {
    pub const NONE: FieldOptions = FieldOptions {
        column: None,
        primary_key: None,
        skip: false,
    };

    #[must_use]
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = Some(KeyMarker::Field);
        self
    }

    #[must_use]
    pub const fn primary_key_named(mut self, column: &'static str) -> Self {
        self.primary_key = Some(KeyMarker::Named(column));
        self
    }

    /// Exclude the field: never a column, never read or written.
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// One declared field, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub options: FieldOptions,
}

impl FieldDef {
    #[must_use]
    pub const fn new(name: &'static str, options: FieldOptions) -> Self {
        Self { name, options }
    }
}

/// An included field and the column it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: &'static str,
    pub column: String,
}

/// Column metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    type_name: &'static str,
    table_name: String,
    columns: Vec<ColumnDef>,
    primary_key_index: usize,
    primary_key_column: String,
}

impl RecordSchema {
    /// Derive the schema from declared fields.
    ///
    /// - column: the `column` override, else [`to_column_case`] of the field name;
    /// - table: the lower-cased type name;
    /// - primary key: the field marked `pk`, else the field whose column is `id`
    ///   (any case), else the first included field.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` when the type has no included fields,
    /// two fields share a column, more than one field is marked `pk`, or a skipped
    /// field is marked `pk`.
    pub fn build(type_name: &'static str, fields: &[FieldDef]) -> Result<Self, SqlRecordDbError> {
        Self::validate(type_name, fields).map_err(SqlRecordDbError::ShapeError)
    }

    /// Build once and cache in `cell`; every later call returns the cached outcome.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if the declared fields do not form a
    /// valid record (see [`RecordSchema::build`]).
    pub fn resolve(
        cell: &'static OnceLock<Result<RecordSchema, String>>,
        type_name: &'static str,
        fields: &[FieldDef],
    ) -> Result<&'static RecordSchema, SqlRecordDbError> {
        cell.get_or_init(|| Self::validate(type_name, fields))
            .as_ref()
            .map_err(|msg| SqlRecordDbError::ShapeError(msg.clone()))
    }

    fn validate(type_name: &'static str, fields: &[FieldDef]) -> Result<Self, String> {
        if let Some(field) = fields
            .iter()
            .find(|f| f.options.skip && f.options.primary_key.is_some())
        {
            return Err(format!(
                "`{type_name}.{}` is skipped and cannot be the primary key",
                field.name
            ));
        }

        let included: Vec<&FieldDef> = fields.iter().filter(|f| !f.options.skip).collect();
        if included.is_empty() {
            return Err(format!("record type `{type_name}` has no persisted fields"));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(included.len());
        for field in &included {
            let column = field
                .options
                .column
                .map_or_else(|| to_column_case(field.name), str::to_string);
            if !seen.insert(column.clone()) {
                return Err(format!(
                    "record type `{type_name}` maps more than one field to column `{column}`"
                ));
            }
            columns.push(ColumnDef {
                field: field.name,
                column,
            });
        }

        let marked: Vec<(usize, KeyMarker)> = included
            .iter()
            .enumerate()
            .filter_map(|(idx, f)| f.options.primary_key.map(|marker| (idx, marker)))
            .collect();
        if marked.len() > 1 {
            return Err(format!(
                "record type `{type_name}` marks {} fields as primary key",
                marked.len()
            ));
        }

        let (primary_key_index, primary_key_column) = match marked.first() {
            Some((idx, KeyMarker::Named(name))) => (*idx, (*name).to_string()),
            Some((idx, KeyMarker::Field)) => (*idx, columns[*idx].column.clone()),
            None => columns
                .iter()
                .position(|c| c.column.eq_ignore_ascii_case("id"))
                .map_or_else(
                    || (0, columns[0].column.clone()),
                    |idx| (idx, columns[idx].column.clone()),
                ),
        };

        Ok(RecordSchema {
            type_name,
            table_name: type_name.to_lowercase(),
            columns,
            primary_key_index,
            primary_key_column,
        })
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.column.as_str())
    }

    /// Number of included fields (and columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn primary_key_index(&self) -> usize {
        self.primary_key_index
    }

    #[must_use]
    pub fn primary_key_column(&self) -> &str {
        &self.primary_key_column
    }

    #[must_use]
    pub fn primary_key_field(&self) -> &'static str {
        self.columns[self.primary_key_index].field
    }
}

/// A flat struct persisted as one table row.
///
/// `field_values` and `scan_row` walk the included fields in declaration order, the same
/// order as [`RecordSchema::columns`]; SELECT lists are rendered in that order and rows
/// are scanned back positionally.
pub trait Record: Default {
    /// The cached column metadata.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if the type's declared mapping is invalid.
    fn schema() -> Result<&'static RecordSchema, SqlRecordDbError>;

    /// Current values of the included fields.
    fn field_values(&self) -> Vec<RowValues>;

    /// Overwrite the included fields from one row's values, positionally. Skipped fields
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` when the row is narrower or wider than the
    /// record or a cell does not decode into its field.
    fn scan_row(&mut self, values: &[RowValues]) -> Result<(), SqlRecordDbError>;

    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if the schema is invalid.
    fn primary_key_value(&self) -> Result<RowValues, SqlRecordDbError> {
        let schema = Self::schema()?;
        self.field_values()
            .into_iter()
            .nth(schema.primary_key_index())
            .ok_or_else(|| {
                SqlRecordDbError::ShapeError(format!(
                    "`{}` has no value for its primary key",
                    schema.type_name()
                ))
            })
    }

    /// # Errors
    ///
    /// Returns `SqlRecordDbError::ShapeError` if `value` does not decode into the key
    /// field's type.
    fn set_primary_key(&mut self, value: RowValues) -> Result<(), SqlRecordDbError> {
        let schema = Self::schema()?;
        let mut values = self.field_values();
        let slot = values.get_mut(schema.primary_key_index()).ok_or_else(|| {
            SqlRecordDbError::ShapeError(format!(
                "`{}` has no value for its primary key",
                schema.type_name()
            ))
        })?;
        *slot = value;
        self.scan_row(&values)
    }
}

#[doc(hidden)]
pub fn scan_field<T: SqlField>(
    cells: &mut std::slice::Iter<'_, RowValues>,
    record: &str,
    field: &str,
) -> Result<T, SqlRecordDbError> {
    let cell = cells.next().ok_or_else(|| {
        SqlRecordDbError::ShapeError(format!("row for `{record}` ends before field `{field}`"))
    })?;
    T::from_row_value(cell).map_err(|err| match err {
        SqlRecordDbError::ShapeError(msg) => {
            SqlRecordDbError::ShapeError(format!("`{record}.{field}`: {msg}"))
        }
        other => other,
    })
}

#[doc(hidden)]
pub fn finish_scan(
    cells: std::slice::Iter<'_, RowValues>,
    record: &str,
) -> Result<(), SqlRecordDbError> {
    match cells.len() {
        0 => Ok(()),
        extra => Err(SqlRecordDbError::ShapeError(format!(
            "row for `{record}` has {extra} more column(s) than the record"
        ))),
    }
}

/// Declare a record struct and implement [`Record`](crate::record::Record) for it.
///
/// Fields take at most one `#[column(...)]` attribute with comma-separated options:
/// `column = "name"`, `pk`, `pk = "key_column"`, or `skip` on its own. Included field
/// types implement [`SqlField`](crate::types::SqlField); skipped fields only need
/// `Default`. The struct itself must derive (or implement) `Default`.
///
/// ```rust
/// use sql_record::record;
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// pub struct Author {
///     pub name: String,
/// }
///
/// record! {
///     #[derive(Debug, Default, Clone, PartialEq)]
///     pub struct Article {
///         #[column(pk = "id")]
///         pub id: i64,
///         pub title: String,
///         #[column(column = "body")]
///         pub content: String,
///         #[column(skip)]
///         pub author: Author,
///     }
/// }
///
/// use sql_record::record::Record;
/// let schema = Article::schema().unwrap();
/// assert_eq!(schema.table_name(), "article");
/// assert_eq!(schema.column_names().collect::<Vec<_>>(), ["id", "title", "body"]);
/// ```
#[macro_export]
macro_rules! record {
    (@options $($opt:tt)*) => {
        $crate::record!(@fold ($crate::record::FieldOptions::NONE) $($opt)*)
    };
    (@fold ($acc:expr)) => { $acc };
    (@fold ($acc:expr) skip $(, $($rest:tt)*)?) => {
        $crate::record!(@fold ($acc.skip()) $($($rest)*)?)
    };
    (@fold ($acc:expr) pk = $key:literal $(, $($rest:tt)*)?) => {
        $crate::record!(@fold ($acc.primary_key_named($key)) $($($rest)*)?)
    };
    (@fold ($acc:expr) pk $(, $($rest:tt)*)?) => {
        $crate::record!(@fold ($acc.primary_key()) $($($rest)*)?)
    };
    (@fold ($acc:expr) column = $col:literal $(, $($rest:tt)*)?) => {
        $crate::record!(@fold ($acc.column($col)) $($($rest)*)?)
    };

    (@push $values:ident, ($($target:tt)+), skip) => {};
    (@push $values:ident, ($($target:tt)+), $($opt:tt)*) => {
        $values.push($crate::types::SqlField::to_row_value(&$($target)+));
    };

    (@scan $cells:ident, $record:ident, $field:ident, ($($target:tt)+), $fty:ty, skip) => {};
    (@scan $cells:ident, $record:ident, $field:ident, ($($target:tt)+), $fty:ty, $($opt:tt)*) => {
        $($target)+ = $crate::record::scan_field::<$fty>(
            &mut $cells,
            stringify!($record),
            stringify!($field),
        )?;
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[column($($opt:tt)*)])?
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field: $fty, )*
        }

        impl $crate::record::Record for $name {
            fn schema() -> ::std::result::Result<
                &'static $crate::record::RecordSchema,
                $crate::SqlRecordDbError,
            > {
                static SCHEMA: ::std::sync::OnceLock<
                    ::std::result::Result<$crate::record::RecordSchema, ::std::string::String>,
                > = ::std::sync::OnceLock::new();
                $crate::record::RecordSchema::resolve(
                    &SCHEMA,
                    stringify!($name),
                    &[
                        $(
                            $crate::record::FieldDef::new(
                                stringify!($field),
                                $crate::record!(@options $($($opt)*)?),
                            ),
                        )*
                    ],
                )
            }

            fn field_values(&self) -> ::std::vec::Vec<$crate::types::RowValues> {
                let mut values = ::std::vec::Vec::new();
                $( $crate::record!(@push values, (self.$field), $($($opt)*)?); )*
                values
            }

            fn scan_row(
                &mut self,
                row: &[$crate::types::RowValues],
            ) -> ::std::result::Result<(), $crate::SqlRecordDbError> {
                let mut cells = row.iter();
                $( $crate::record!(@scan cells, $name, $field, (self.$field), $fty, $($($opt)*)?); )*
                $crate::record::finish_scan(cells, stringify!($name))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(name: &'static str) -> FieldDef {
        FieldDef::new(name, FieldOptions::NONE)
    }

    #[test]
    fn field_named_id_is_the_default_key() {
        let schema =
            RecordSchema::build("Comment", &[plain("body"), plain("ID"), plain("post_id")])
                .unwrap();
        assert_eq!(schema.primary_key_index(), 1);
        assert_eq!(schema.primary_key_column(), "id");
        assert_eq!(schema.table_name(), "comment");
    }

    #[test]
    fn marked_key_wins_regardless_of_name() {
        let schema = RecordSchema::build(
            "Session",
            &[
                plain("id"),
                FieldDef::new("token", FieldOptions::NONE.primary_key()),
            ],
        )
        .unwrap();
        assert_eq!(schema.primary_key_field(), "token");
        assert_eq!(schema.primary_key_column(), "token");
    }

    #[test]
    fn named_key_overrides_the_key_column() {
        let schema = RecordSchema::build(
            "Article",
            &[FieldDef::new("ID", FieldOptions::NONE.primary_key_named("article_id"))],
        )
        .unwrap();
        assert_eq!(schema.primary_key_column(), "article_id");
        assert_eq!(schema.column_names().collect::<Vec<_>>(), ["id"]);
    }

    #[test]
    fn first_field_is_the_fallback_key() {
        let schema = RecordSchema::build("Tag", &[plain("Slug"), plain("Label")]).unwrap();
        assert_eq!(schema.primary_key_index(), 0);
        assert_eq!(schema.primary_key_column(), "slug");
    }

    #[test]
    fn table_name_is_lowercased_not_snake_cased() {
        let schema = RecordSchema::build("BlogPost", &[plain("ID")]).unwrap();
        assert_eq!(schema.table_name(), "blogpost");
    }

    #[test]
    fn skipped_fields_are_not_columns() {
        let schema = RecordSchema::build(
            "Article",
            &[
                plain("ID"),
                plain("UpdatedAt"),
                FieldDef::new("Author", FieldOptions::NONE.skip()),
                FieldDef::new("Content", FieldOptions::NONE.column("body")),
            ],
        )
        .unwrap();
        assert_eq!(
            schema.column_names().collect::<Vec<_>>(),
            ["id", "updated_at", "body"]
        );
    }

    #[test]
    fn invalid_mappings_are_shape_errors() {
        let cases: Vec<Vec<FieldDef>> = vec![
            vec![],
            vec![FieldDef::new("author", FieldOptions::NONE.skip())],
            vec![plain("name"), FieldDef::new("title", FieldOptions::NONE.column("name"))],
            vec![
                FieldDef::new("a", FieldOptions::NONE.primary_key()),
                FieldDef::new("b", FieldOptions::NONE.primary_key()),
            ],
            vec![
                plain("id"),
                FieldDef::new("author", FieldOptions::NONE.skip().primary_key()),
            ],
        ];
        for fields in cases {
            assert!(matches!(
                RecordSchema::build("Broken", &fields),
                Err(SqlRecordDbError::ShapeError(_))
            ));
        }
    }
}
