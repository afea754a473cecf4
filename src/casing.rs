//! Identifier casing between Rust-style field names and snake_case column names.

use std::sync::LazyLock;

use regex::Regex;

// A run of capitals followed by a lowercase letter gives its last capital to the
// next token: `HTTPStatus` -> `HTTP` + `Status`.
static CAMEL_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[^A-Z]*|[A-Z]*)([A-Z][^A-Z]+|$)").expect("column-case pattern is valid")
});

static UNDERSCORE_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[A-Za-z])|_([A-Za-z])").expect("field-case pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace pattern is valid")
});

/// Convert an identifier such as `FooID` or `HTTPStatusCode` to its column form
/// (`foo_id`, `http_status_code`).
///
/// Surrounding whitespace is trimmed and internal whitespace runs become a single
/// underscore. Already snake_case input comes back unchanged.
///
/// ```rust
/// use sql_record::casing::to_column_case;
///
/// assert_eq!(to_column_case("ParseURLDoParse"), "parse_url_do_parse");
/// assert_eq!(to_column_case("created_at"), "created_at");
/// ```
#[must_use]
pub fn to_column_case(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let mut tokens: Vec<&str> = Vec::new();
    for caps in CAMEL_TOKENS.captures_iter(trimmed) {
        for group in [caps.get(1), caps.get(2)].into_iter().flatten() {
            let token = group.as_str().trim();
            if !token.is_empty() {
                tokens.push(token);
            }
        }
    }
    let joined = tokens.join("_").to_lowercase();
    WHITESPACE_RUN.replace_all(&joined, "_").into_owned()
}

/// Inverse of [`to_column_case`]: uppercase the first letter and every letter after an
/// underscore, dropping those underscores (`foo_bar_id` -> `FooBarId`).
#[must_use]
pub fn to_field_case(column: &str) -> String {
    UNDERSCORE_LETTER
        .replace_all(column, |caps: &regex::Captures<'_>| {
            caps.get(0)
                .map(|m| m.as_str().replace('_', "").to_uppercase())
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMN_CASES: &[(&str, &str)] = &[
        ("", ""),
        ("F", "f"),
        ("Foo", "foo"),
        ("FooB", "foo_b"),
        ("FooID", "foo_id"),
        (" FooBar\t", "foo_bar"),
        ("HTTPStatusCode", "http_status_code"),
        ("ParseURLDoParse", "parse_url_do_parse"),
        ("Convert Space", "convert_space"),
        ("Skip   MultipleSpaces", "skip_multiple_spaces"),
    ];

    #[test]
    fn converts_exported_names_to_columns() {
        for (input, expected) in COLUMN_CASES {
            assert_eq!(to_column_case(input), *expected, "input {input:?}");
        }
    }

    #[test]
    fn column_case_is_idempotent() {
        for (_, expected) in COLUMN_CASES {
            assert_eq!(to_column_case(expected), *expected);
        }
        assert_eq!(to_column_case("updated_at"), "updated_at");
    }

    #[test]
    fn lowercase_words_with_spaces_collapse() {
        assert_eq!(to_column_case("title  text"), "title_text");
    }

    #[test]
    fn column_case_survives_odd_input() {
        assert_eq!(to_column_case("   "), "");
        assert_eq!(to_column_case("ÄpfelÜber"), "äpfelüber");
        assert_eq!(to_column_case("a1B2"), "a1_b2");
    }

    #[test]
    fn converts_columns_back_to_field_case() {
        assert_eq!(to_field_case("foo_bar_id"), "FooBarId");
        assert_eq!(to_field_case("id"), "Id");
        assert_eq!(to_field_case(""), "");
        assert_eq!(to_field_case("http_status_code"), "HttpStatusCode");
    }
}
