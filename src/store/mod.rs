pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::record::ReviewRecord;

/// Append-only record of every processed review. Records are never mutated
/// or deleted once stored.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persist a record and return its id.
    async fn append(&self, record: &ReviewRecord) -> Result<i64>;
    async fn get(&self, id: i64) -> Result<Option<ReviewRecord>>;
    /// Up to `limit` most recent records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<(i64, ReviewRecord)>>;
    async fn count(&self) -> Result<u64>;
}
