use reviewtag::record::{ReviewRecord, TagSource};
use reviewtag::store::ReviewStore;
use reviewtag::store::sqlite::SqliteReviewStore;

fn record(text: &str, tags: &[&str], source: TagSource) -> ReviewRecord {
    ReviewRecord::new(
        text,
        tags.iter().map(|t| t.to_string()).collect(),
        0.125,
        source,
    )
}

#[tokio::test]
async fn append_and_get_round_trip() {
    let store = SqliteReviewStore::in_memory().unwrap();
    let original = record("late again", &["late_delivery"], TagSource::Heuristic);

    let id = store.append(&original).await.unwrap();
    let loaded = store.get(id).await.unwrap().unwrap();

    assert_eq!(loaded, original);
}

#[tokio::test]
async fn ids_increase_in_append_order() {
    let store = SqliteReviewStore::in_memory().unwrap();

    let first = store
        .append(&record("one", &["a"], TagSource::Capability))
        .await
        .unwrap();
    let second = store
        .append(&record("two", &[], TagSource::Heuristic))
        .await
        .unwrap();

    assert!(second > first);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = SqliteReviewStore::in_memory().unwrap();
    assert!(store.get(42).await.unwrap().is_none());
}

#[tokio::test]
async fn zero_tag_record_is_stored() {
    let store = SqliteReviewStore::in_memory().unwrap();
    let id = store
        .append(&record("", &[], TagSource::Heuristic))
        .await
        .unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert!(loaded.tags.is_empty());
    assert_eq!(loaded.source, TagSource::Heuristic);
}

#[tokio::test]
async fn persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews-test.db");
    let path_str = path.to_str().unwrap();

    let id = {
        let store = SqliteReviewStore::new(path_str).unwrap();
        store
            .append(&record("kept", &["pricing"], TagSource::Capability))
            .await
            .unwrap()
    };

    let store = SqliteReviewStore::new(path_str).unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.text, "kept");
    assert_eq!(loaded.source, TagSource::Capability);
}

#[tokio::test]
async fn recent_is_newest_first_and_limited() {
    let store = SqliteReviewStore::in_memory().unwrap();
    let mut ids = Vec::new();
    for text in ["first", "second", "third"] {
        ids.push(
            store
                .append(&record(text, &["a"], TagSource::Heuristic))
                .await
                .unwrap(),
        );
    }

    let recent = store.recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].0, ids[2]);
    assert_eq!(recent[0].1.text, "third");
    assert_eq!(recent[1].1.text, "second");

    assert_eq!(store.recent(10).await.unwrap().len(), 3);
    assert!(store.recent(0).await.unwrap().is_empty());
}
