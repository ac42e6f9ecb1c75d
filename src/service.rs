//! Per-review pipeline: tag, store, fold. Queries read the aggregate only.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregate::{Aggregator, Summary};
use crate::record::ReviewRecord;
use crate::store::ReviewStore;
use crate::tagger::Dispatcher;

/// A stored review and the id the store assigned it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedReview {
    pub id: i64,
    pub record: ReviewRecord,
}

pub struct ReviewService {
    dispatcher: Dispatcher,
    store: Arc<dyn ReviewStore>,
    aggregator: Arc<dyn Aggregator>,
}

impl ReviewService {
    pub fn new(
        dispatcher: Dispatcher,
        store: Arc<dyn ReviewStore>,
        aggregator: Arc<dyn Aggregator>,
    ) -> Self {
        Self {
            dispatcher,
            store,
            aggregator,
        }
    }

    /// Tag `text`, persist the record, then fold it into the aggregate.
    ///
    /// A record is accepted once the store has it. The fold runs exactly
    /// once after that; a failed fold is logged and does not fail the call,
    /// so a retrying client never stores the same review twice.
    pub async fn analyze(&self, text: &str) -> Result<AnalyzedReview> {
        let tagging = self.dispatcher.tag(text).await;
        let record = ReviewRecord::new(
            text,
            tagging.tags,
            tagging.processing_time,
            tagging.source,
        );

        let id = self.store.append(&record).await?;
        if let Err(err) = self.aggregator.fold(&record) {
            error!(id, "failed to fold stored review into aggregate: {err:#}");
        }

        info!(
            id,
            source = %record.source,
            tags = ?record.tags,
            processing_time = record.processing_time,
            "review processed"
        );
        Ok(AnalyzedReview { id, record })
    }

    pub fn summary(&self) -> Result<Summary> {
        self.aggregator.summary()
    }
}
