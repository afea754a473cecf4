#![allow(dead_code)]

use chrono::NaiveDateTime;
use rusqlite::Connection;
use sql_record::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Author {
    pub name: String,
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Article {
        #[column(pk = "id")]
        pub id: i64,
        pub title: String,
        #[column(skip)]
        pub author: Author,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Sample {
        pub id: i64,
        pub small: i32,
        pub label: String,
        pub flag: bool,
        pub created_at: NaiveDateTime,
        pub deleted_at: Option<NaiveDateTime>,
        pub ratio: f64,
        pub note: Option<String>,
        pub payload: Vec<u8>,
        pub extra: serde_json::Value,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Slug {
        #[column(pk)]
        pub name: String,
        pub hits: i64,
    }
}

pub const SCHEMA: &str = "
    CREATE TABLE article (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL
    );
    CREATE TABLE sample (
        id INTEGER PRIMARY KEY,
        small INTEGER NOT NULL,
        label TEXT NOT NULL,
        flag INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        deleted_at TEXT,
        ratio REAL NOT NULL,
        note TEXT,
        payload BLOB NOT NULL,
        extra TEXT NOT NULL
    );
    CREATE TABLE slug (
        name TEXT PRIMARY KEY,
        hits INTEGER NOT NULL
    );
";

pub fn setup_db() -> Result<RecordDb<'static>, SqlRecordDbError> {
    let db = RecordDb::new(Connection::open_in_memory()?, false);
    db.connection().execute_batch(SCHEMA)?;
    Ok(db)
}

pub fn article(title: &str) -> Article {
    Article {
        id: 0,
        title: title.to_string(),
        author: Author::default(),
    }
}

pub fn find_article(db: &RecordDb<'_>, id: i64) -> Result<Article, SqlRecordDbError> {
    let mut found = Article {
        id,
        ..Article::default()
    };
    db.find(&mut found)?;
    Ok(found)
}
