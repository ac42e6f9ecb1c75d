//! Running statistics over every accepted review.
//!
//! [`AggregationState`] is the plain fold: no locking, no I/O. The
//! [`Aggregator`] trait is the shared handle the service holds; each
//! implementation applies a fold atomically and answers reads from a
//! consistent snapshot.

pub mod sqlite;

use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::consts::SUMMARY_TOP_K;
use crate::record::ReviewRecord;

/// A tag and how many records carried it.
pub type TagCount = (String, u64);

/// The composed read behind `GET /summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_reviews: u64,
    pub top_tags: Vec<TagCount>,
    pub avg_processing_time: f64,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            total_reviews: 0,
            top_tags: Vec::new(),
            avg_processing_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationState {
    total_reviews: u64,
    /// Only tags seen at least once are present.
    tag_counts: HashMap<String, u64>,
    total_processing_time: f64,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one record. O(K).
    pub fn fold(&mut self, record: &ReviewRecord) {
        self.total_reviews += 1;
        self.total_processing_time += record.processing_time;
        for (i, tag) in record.tags.iter().enumerate() {
            if record.tags[..i].contains(tag) {
                continue;
            }
            *self.tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    pub fn top_k(&self, k: usize) -> Vec<TagCount> {
        rank_top_k(self.tag_counts.iter().map(|(tag, count)| (tag.as_str(), *count)), k)
    }

    /// Mean seconds per review; `0.0` before any review.
    pub fn average_processing_time(&self) -> f64 {
        if self.total_reviews == 0 {
            0.0
        } else {
            self.total_processing_time / self.total_reviews as f64
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_reviews: self.total_reviews,
            top_tags: self.top_k(SUMMARY_TOP_K),
            avg_processing_time: self.average_processing_time(),
        }
    }

    pub fn total_reviews(&self) -> u64 {
        self.total_reviews
    }

    pub fn total_processing_time(&self) -> f64 {
        self.total_processing_time
    }

    pub fn tag_count(&self, tag: &str) -> u64 {
        self.tag_counts.get(tag).copied().unwrap_or(0)
    }

    pub fn distinct_tags(&self) -> usize {
        self.tag_counts.len()
    }
}

/// Count descending, then tag ascending.
fn by_rank(a: &(&str, u64), b: &(&str, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// The `k` highest-count tags in rank order. Partial selection first, so
/// only the kept head is fully sorted: O(n + k log k).
pub fn rank_top_k<'a, I>(counts: I, k: usize) -> Vec<TagCount>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut entries: Vec<(&str, u64)> = counts.into_iter().collect();
    if entries.len() > k {
        entries.select_nth_unstable_by(k - 1, by_rank);
        entries.truncate(k);
    }
    entries.sort_unstable_by(by_rank);

    entries
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect()
}

/// Shared, thread-safe aggregate. `fold` is applied atomically with respect
/// to other folds and reads; `summary` observes one consistent snapshot.
pub trait Aggregator: Send + Sync {
    fn fold(&self, record: &ReviewRecord) -> Result<()>;
    fn top_k(&self, k: usize) -> Result<Vec<TagCount>>;
    fn average_processing_time(&self) -> Result<f64>;
    fn summary(&self) -> Result<Summary>;
}

/// Process-local aggregate behind a single mutex. Reset on restart.
#[derive(Debug, Default)]
pub struct InMemoryAggregator {
    state: Mutex<AggregationState>,
}

impl InMemoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AggregationState> {
        // A fold cannot panic halfway, so a poisoned state is still whole.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AggregationState {
        self.lock().clone()
    }
}

impl Aggregator for InMemoryAggregator {
    fn fold(&self, record: &ReviewRecord) -> Result<()> {
        self.lock().fold(record);
        Ok(())
    }

    fn top_k(&self, k: usize) -> Result<Vec<TagCount>> {
        Ok(self.lock().top_k(k))
    }

    fn average_processing_time(&self) -> Result<f64> {
        Ok(self.lock().average_processing_time())
    }

    fn summary(&self) -> Result<Summary> {
        Ok(self.lock().summary())
    }
}
