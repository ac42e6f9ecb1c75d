use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

use super::ReviewStore;
use crate::record::{ReviewRecord, TagSource};

/// SQLite-backed review store.
pub struct SqliteReviewStore {
    conn: Mutex<Connection>,
}

impl SqliteReviewStore {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open review database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp       TEXT NOT NULL DEFAULT (datetime('now')),
                text            TEXT NOT NULL,
                tags            TEXT NOT NULL,
                processing_time REAL NOT NULL,
                source          TEXT NOT NULL
            );",
        )
        .context("failed to create reviews table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("review store lock poisoned"))
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    async fn append(&self, record: &ReviewRecord) -> Result<i64> {
        let tags = serde_json::to_string(&record.tags)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reviews (text, tags, processing_time, source) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.text,
                tags,
                record.processing_time,
                record.source.as_str()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<ReviewRecord>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT text, tags, processing_time, source FROM reviews WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((text, tags, processing_time, source)) = row else {
            return Ok(None);
        };
        decode_row(id, text, tags, processing_time, source).map(Some)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<(i64, ReviewRecord)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, tags, processing_time, source FROM reviews
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, text, tags, processing_time, source)| {
                Ok((id, decode_row(id, text, tags, processing_time, source)?))
            })
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn decode_row(
    id: i64,
    text: String,
    tags: String,
    processing_time: f64,
    source: String,
) -> Result<ReviewRecord> {
    let tags: Vec<String> =
        serde_json::from_str(&tags).with_context(|| format!("corrupt tags for review {id}"))?;
    let source: TagSource = source.parse()?;
    Ok(ReviewRecord::new(text, tags, processing_time, source))
}
