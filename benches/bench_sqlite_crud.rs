//! Criterion comparison of keyed lookups through raw `rusqlite` and through
//! `RecordDb::find`, over the same seeded in-memory table.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rusqlite::{Connection, params};
use sql_record::prelude::*;

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Item {
        id: i64,
        name: String,
        score: i64,
        active: bool,
    }
}

const SCHEMA: &str = "
    CREATE TABLE item (
        id     INTEGER PRIMARY KEY,
        name   TEXT NOT NULL,
        score  INTEGER NOT NULL,
        active INTEGER NOT NULL
    );
";

/// Resolve how many rows to seed from `BENCH_ROWS`.
fn row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn seeded_db(rows: usize) -> Result<RecordDb<'static>, SqlRecordDbError> {
    let db = RecordDb::new(Connection::open_in_memory()?, false);
    db.connection().execute_batch(SCHEMA)?;
    db.with_transaction(|tx| {
        for n in 0..rows {
            tx.create(&mut Item {
                id: 0,
                name: format!("item-{n}"),
                score: (n % 97) as i64,
                active: n % 2 == 0,
            })?;
        }
        Ok::<_, SqlRecordDbError>(())
    })?;
    Ok(db)
}

fn shuffled_ids(rows: usize) -> Vec<i64> {
    let mut ids: Vec<i64> = (1..=rows as i64).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(1_234_567_890);
    ids.shuffle(&mut rng);
    ids
}

fn bench_lookup(c: &mut Criterion) {
    let rows = row_count();
    let db = seeded_db(rows).expect("seed benchmark table");
    let ids = shuffled_ids(rows);

    let mut group = c.benchmark_group("sqlite_single_row_lookup");
    group.throughput(Throughput::Elements(ids.len() as u64));

    group.bench_with_input(BenchmarkId::new("rusqlite", rows), &ids, |b, ids| {
        b.iter(|| {
            let mut stmt = db
                .connection()
                .prepare("SELECT id, name, score, active FROM item WHERE id = ?1")
                .expect("prepare lookup");
            for id in ids {
                let item = stmt
                    .query_row(params![id], |row| {
                        Ok(Item {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            score: row.get(2)?,
                            active: row.get(3)?,
                        })
                    })
                    .expect("raw lookup");
                black_box(item);
            }
        });
    });

    group.bench_with_input(BenchmarkId::new("record_db_find", rows), &ids, |b, ids| {
        b.iter(|| {
            for id in ids {
                let mut item = Item {
                    id: *id,
                    ..Item::default()
                };
                db.find(&mut item).expect("record lookup");
                black_box(item);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
