use std::sync::Arc;

use reviewtag::aggregate::sqlite::SqliteAggregator;
use reviewtag::aggregate::{Aggregator, InMemoryAggregator, Summary, TagCount};
use reviewtag::classifier::mock::{MockClassifier, MockReply};
use reviewtag::config::TaggerConfig;
use reviewtag::record::{ReviewRecord, TagSource};
use reviewtag::service::ReviewService;
use reviewtag::store::ReviewStore;
use reviewtag::store::sqlite::SqliteReviewStore;
use reviewtag::tagger::{CapabilityTagger, Dispatcher, heuristic};

fn capability_dispatcher(mock: Arc<MockClassifier>) -> Dispatcher {
    let config = TaggerConfig::default();
    let primary = CapabilityTagger::new(mock, heuristic::taxonomy(), config.max_tags);
    Dispatcher::new(Some(Arc::new(primary)), &config)
}

#[tokio::test]
async fn analyze_stores_what_it_returns() {
    let store = Arc::new(SqliteReviewStore::in_memory().unwrap());
    let mock = Arc::new(MockClassifier::always(r#"["sizing", "fabric_quality"]"#));
    let service = ReviewService::new(
        capability_dispatcher(mock.clone()),
        store.clone(),
        Arc::new(InMemoryAggregator::new()),
    );

    let analyzed = service.analyze("runs small, thin fabric").await.unwrap();
    assert_eq!(analyzed.record.source, TagSource::Capability);
    assert_eq!(analyzed.record.tags, vec!["sizing", "fabric_quality"]);

    let stored = store.get(analyzed.id).await.unwrap().unwrap();
    assert_eq!(stored, analyzed.record);
    assert!(mock.prompts()[0].contains("runs small, thin fabric"));
}

#[tokio::test]
async fn provider_failure_still_counts_review() {
    let mock = Arc::new(MockClassifier::new(vec![MockReply::Fail(
        "rate limited".to_string(),
    )]));
    let service = ReviewService::new(
        capability_dispatcher(mock),
        Arc::new(SqliteReviewStore::in_memory().unwrap()),
        Arc::new(InMemoryAggregator::new()),
    );

    let analyzed = service.analyze("way too expensive").await.unwrap();
    assert_eq!(analyzed.record.source, TagSource::Heuristic);
    assert_eq!(analyzed.record.tags, vec!["pricing"]);

    let summary = service.summary().unwrap();
    assert_eq!(summary.total_reviews, 1);
    assert_eq!(summary.top_tags, vec![("pricing".to_string(), 1)]);
}

#[tokio::test]
async fn concurrent_analyze_loses_no_updates() {
    let store = Arc::new(SqliteReviewStore::in_memory().unwrap());
    let service = Arc::new(ReviewService::new(
        Dispatcher::heuristic_only(&TaggerConfig::default()),
        store.clone(),
        Arc::new(SqliteAggregator::in_memory().unwrap()),
    ));

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let text = if i % 2 == 0 {
                    "package arrived late"
                } else {
                    "asked for a refund"
                };
                service.analyze(text).await.unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let summary = service.summary().unwrap();
    assert_eq!(summary.total_reviews, 50);
    assert_eq!(store.count().await.unwrap(), 50);
    assert_eq!(
        summary.top_tags,
        vec![
            ("customer_service".to_string(), 25),
            ("late_delivery".to_string(), 25),
            ("refund_request".to_string(), 25),
        ]
    );
}

struct BrokenAggregator;

impl Aggregator for BrokenAggregator {
    fn fold(&self, _record: &ReviewRecord) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    fn top_k(&self, _k: usize) -> anyhow::Result<Vec<TagCount>> {
        Ok(Vec::new())
    }

    fn average_processing_time(&self) -> anyhow::Result<f64> {
        Ok(0.0)
    }

    fn summary(&self) -> anyhow::Result<Summary> {
        Ok(Summary::empty())
    }
}

#[tokio::test]
async fn stored_review_is_accepted_when_fold_fails() {
    let store = Arc::new(SqliteReviewStore::in_memory().unwrap());
    let service = ReviewService::new(
        Dispatcher::heuristic_only(&TaggerConfig::default()),
        store.clone(),
        Arc::new(BrokenAggregator),
    );

    let analyzed = service.analyze("arrived late").await.unwrap();
    assert_eq!(analyzed.record.tags, vec!["late_delivery", "shipping_delay"]);
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.get(analyzed.id).await.unwrap().unwrap(), analyzed.record);
}
