use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

use super::{Aggregator, Summary, TagCount};
use crate::consts::SUMMARY_TOP_K;
use crate::record::ReviewRecord;

/// Aggregate counters persisted in SQLite, so the summary survives restarts
/// and the tag table is not bounded by process memory.
///
/// Can share a database file with [`SqliteReviewStore`](crate::store::sqlite::SqliteReviewStore).
pub struct SqliteAggregator {
    conn: Mutex<Connection>,
}

impl SqliteAggregator {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open aggregate database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS aggregate_totals (
                id                    INTEGER PRIMARY KEY CHECK (id = 1),
                total_reviews         INTEGER NOT NULL,
                total_processing_time REAL NOT NULL
            );
            INSERT OR IGNORE INTO aggregate_totals (id, total_reviews, total_processing_time)
                VALUES (1, 0, 0.0);
            CREATE TABLE IF NOT EXISTS tag_counts (
                tag   TEXT PRIMARY KEY,
                count INTEGER NOT NULL CHECK (count >= 1)
            );",
        )
        .context("failed to create aggregate tables")?;
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
            .map_err(|_| anyhow!("aggregate connection lock poisoned"))
    }
}

fn read_totals(conn: &Connection) -> Result<(u64, f64)> {
    let totals = conn
        .query_row(
            "SELECT total_reviews, total_processing_time FROM aggregate_totals WHERE id = 1",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
        )
        .optional()?
        .unwrap_or((0, 0.0));
    Ok((totals.0 as u64, totals.1))
}

fn read_top_k(conn: &Connection, k: usize) -> Result<Vec<TagCount>> {
    if k == 0 {
        return Ok(Vec::new());
    }
    let limit = i64::try_from(k).unwrap_or(i64::MAX);
    // BINARY collation orders by bytes, same as `str::cmp`.
    let mut stmt =
        conn.prepare("SELECT tag, count FROM tag_counts ORDER BY count DESC, tag ASC LIMIT ?1")?;
    let rows = stmt
        .query_map([limit], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn average(total_reviews: u64, total_processing_time: f64) -> f64 {
    if total_reviews == 0 {
        0.0
    } else {
        total_processing_time / total_reviews as f64
    }
}

impl Aggregator for SqliteAggregator {
    fn fold(&self, record: &ReviewRecord) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE aggregate_totals
             SET total_reviews = total_reviews + 1,
                 total_processing_time = total_processing_time + ?1
             WHERE id = 1",
            [record.processing_time],
        )?;
        for (i, tag) in record.tags.iter().enumerate() {
            if record.tags[..i].contains(tag) {
                continue;
            }
            tx.execute(
                "INSERT INTO tag_counts (tag, count) VALUES (?1, 1)
                 ON CONFLICT(tag) DO UPDATE SET count = count + 1",
                [tag.as_str()],
            )?;
        }
        tx.commit().context("failed to commit aggregate fold")?;
        Ok(())
    }

    fn top_k(&self, k: usize) -> Result<Vec<TagCount>> {
        let conn = self.lock()?;
        read_top_k(&conn, k)
    }

    fn average_processing_time(&self) -> Result<f64> {
        let conn = self.lock()?;
        let (total_reviews, total_processing_time) = read_totals(&conn)?;
        Ok(average(total_reviews, total_processing_time))
    }

    fn summary(&self) -> Result<Summary> {
        let conn = self.lock()?;
        let (total_reviews, total_processing_time) = read_totals(&conn)?;
        Ok(Summary {
            total_reviews,
            top_tags: read_top_k(&conn, SUMMARY_TOP_K)?,
            avg_processing_time: average(total_reviews, total_processing_time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregationState, InMemoryAggregator};
    use crate::record::TagSource;

    fn record(tags: &[&str], time: f64) -> ReviewRecord {
        ReviewRecord::new(
            "review",
            tags.iter().map(|t| t.to_string()).collect(),
            time,
            TagSource::Heuristic,
        )
    }

    #[test]
    fn fresh_database_has_empty_summary() {
        let aggregator = SqliteAggregator::in_memory().unwrap();
        assert_eq!(aggregator.summary().unwrap(), Summary::empty());
        assert_eq!(aggregator.average_processing_time().unwrap(), 0.0);
    }

    #[test]
    fn two_record_scenario() {
        let aggregator = SqliteAggregator::in_memory().unwrap();
        aggregator.fold(&record(&["a", "b"], 1.0)).unwrap();
        aggregator.fold(&record(&["a"], 3.0)).unwrap();

        let summary = aggregator.summary().unwrap();
        assert_eq!(summary.total_reviews, 2);
        assert_eq!(
            summary.top_tags,
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );
        assert_eq!(summary.avg_processing_time, 2.0);
    }

    #[test]
    fn duplicate_tags_in_record_count_once() {
        let aggregator = SqliteAggregator::in_memory().unwrap();
        aggregator.fold(&record(&["a", "a"], 1.0)).unwrap();
        assert_eq!(aggregator.top_k(5).unwrap(), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn matches_in_memory_ranking() {
        let sqlite = SqliteAggregator::in_memory().unwrap();
        let memory = InMemoryAggregator::new();
        let mut state = AggregationState::new();

        let records = [
            record(&["pricing", "late_delivery"], 0.1),
            record(&["late_delivery"], 0.2),
            record(&["defective_item", "pricing"], 0.3),
            record(&["customer_service"], 0.4),
            record(&[], 0.5),
        ];
        for r in &records {
            sqlite.fold(r).unwrap();
            memory.fold(r).unwrap();
            state.fold(r);
        }

        for k in [0, 1, 3, 10] {
            assert_eq!(sqlite.top_k(k).unwrap(), memory.top_k(k).unwrap());
            assert_eq!(sqlite.top_k(k).unwrap(), state.top_k(k));
        }
        let diff = sqlite.average_processing_time().unwrap() - state.average_processing_time();
        assert!(diff.abs() < 1e-9);
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregate-test.db");
        let path_str = path.to_str().unwrap();

        {
            let aggregator = SqliteAggregator::new(path_str).unwrap();
            aggregator.fold(&record(&["late_delivery"], 1.5)).unwrap();
        }

        {
            let aggregator = SqliteAggregator::new(path_str).unwrap();
            let summary = aggregator.summary().unwrap();
            assert_eq!(summary.total_reviews, 1);
            assert_eq!(summary.top_tags, vec![("late_delivery".to_string(), 1)]);
            assert_eq!(summary.avg_processing_time, 1.5);
        }
    }
}
