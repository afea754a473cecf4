mod common;

use std::collections::HashMap;

use common::{Article, Author, article, setup_db};
use sql_record::prelude::*;

fn seeded() -> Result<RecordDb<'static>, SqlRecordDbError> {
    let db = setup_db()?;
    for title in ["alpha", "beta", "beta", "gamma"] {
        db.create(&mut article(title))?;
    }
    Ok(db)
}

fn betas() -> Article {
    Article {
        id: 2,
        title: "beta".into(),
        author: Author::default(),
    }
}

#[test]
fn query_filters_on_every_column() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;

    let mut out = Vec::new();
    db.query(&betas(), &mut out)?;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, 2);

    // A zero key still filters, so the template matches nothing.
    let mut none = Vec::new();
    db.query(&article("beta"), &mut none)?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn query_appends_to_existing_contents() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;
    let mut out = vec![article("already here")];
    db.query(&betas(), &mut out)?;
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].title, "already here");

    let mut boxed: Vec<Box<Article>> = Vec::new();
    db.query_refs(&betas(), &mut boxed)?;
    assert_eq!(boxed.len(), 1);
    assert_eq!(boxed[0].title, "beta");

    let mut keyed: HashMap<i64, Article> = HashMap::new();
    db.query_into_map(&betas(), &mut keyed)?;
    assert_eq!(keyed.keys().copied().collect::<Vec<_>>(), [2]);
    Ok(())
}

#[test]
fn clause_queries_keep_row_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;

    let mut list: Vec<Article> = Vec::new();
    db.query_by_clause("title = 'beta' ORDER BY id DESC", &mut list)?;
    assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), [3, 2]);

    let mut boxed: Vec<Box<Article>> = Vec::new();
    db.query_by_clause_refs("id > 1 ORDER BY id", &mut boxed)?;
    assert_eq!(boxed.iter().map(|a| a.id).collect::<Vec<_>>(), [2, 3, 4]);

    let mut everything: Vec<Article> = Vec::new();
    db.query_by_clause("   ", &mut everything)?;
    assert_eq!(everything.len(), 4);
    Ok(())
}

#[test]
fn clause_queries_into_maps() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;

    let mut keyed: HashMap<i64, Article> = HashMap::new();
    db.query_by_clause_into_map("title = 'beta'", &mut keyed)?;
    assert_eq!(keyed.len(), 2);
    assert_eq!(keyed[&3].title, "beta");

    let mut boxed: HashMap<i64, Box<Article>> = HashMap::new();
    boxed.insert(
        100,
        Box::new(Article {
            id: 100,
            title: "kept".into(),
            author: Author::default(),
        }),
    );
    db.query_by_clause_into_map_refs("", &mut boxed)?;
    assert_eq!(boxed.len(), 5);
    assert_eq!(boxed[&1].title, "alpha");
    Ok(())
}

#[test]
fn cells_that_do_not_fit_are_shape_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = RecordDb::new(rusqlite::Connection::open_in_memory()?, false);
    db.connection().execute_batch(
        "CREATE TABLE article (id INTEGER PRIMARY KEY, title TEXT);
         INSERT INTO article (id, title) VALUES (1, NULL);",
    )?;
    let mut out: Vec<Article> = Vec::new();
    let err = db.query_by_clause("", &mut out).unwrap_err();
    assert!(matches!(err, SqlRecordDbError::ShapeError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn raw_helpers_return_text() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;
    let sql = "SELECT id, title, NULL AS missing FROM article WHERE id <= 2 ORDER BY id";

    let grid = db.raw_grid(sql)?;
    assert_eq!(
        grid,
        vec![
            vec!["1".to_string(), "alpha".to_string(), String::new()],
            vec!["2".to_string(), "beta".to_string(), String::new()],
        ]
    );

    let rows = db.raw_rows(sql)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["title"], "beta");
    assert_eq!(rows[0]["missing"], "");
    Ok(())
}

#[test]
fn raw_helpers_report_store_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = seeded()?;
    assert!(matches!(
        db.raw_grid("SELECT * FROM nowhere"),
        Err(SqlRecordDbError::SqliteError(_))
    ));
    assert!(matches!(
        db.raw_rows("SELEC 1"),
        Err(SqlRecordDbError::SqliteError(_))
    ));
    Ok(())
}
