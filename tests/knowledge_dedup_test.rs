// Exercises corpus creation and upload deduplication by content hash
// (spec §4.5 "Deduplication on upload").

use negentropy_engine::knowledge::KnowledgeRepository;
use sqlx::PgPool;

#[sqlx::test]
async fn identical_bytes_are_deduplicated(pool: PgPool) -> sqlx::Result<()> {
    let repo = KnowledgeRepository::new(pool);
    let corpus = repo.create_corpus("acme", "docs", None, serde_json::json!({})).await.expect("create corpus");

    let bytes = b"the quick brown fox".to_vec();

    let (first, created_first) = repo
        .register_document("acme", corpus.id, "a.txt", "knowledge/acme/a.txt", Some("text/plain"), &bytes)
        .await
        .expect("register first upload");
    assert!(created_first);

    let (second, created_second) = repo
        .register_document("acme", corpus.id, "b.txt", "knowledge/acme/b.txt", Some("text/plain"), &bytes)
        .await
        .expect("register duplicate upload");

    assert!(!created_second, "byte-identical upload must be recognized as a duplicate");
    assert_eq!(first.id, second.id, "duplicate upload must resolve to the original document");
    Ok(())
}

#[sqlx::test]
async fn differing_bytes_are_not_deduplicated(pool: PgPool) -> sqlx::Result<()> {
    let repo = KnowledgeRepository::new(pool);
    let corpus = repo.create_corpus("acme", "docs", None, serde_json::json!({})).await.expect("create corpus");

    let (first, _) = repo
        .register_document("acme", corpus.id, "a.txt", "knowledge/acme/a.txt", Some("text/plain"), b"one")
        .await
        .expect("register a");
    let (second, created) = repo
        .register_document("acme", corpus.id, "b.txt", "knowledge/acme/b.txt", Some("text/plain"), b"two")
        .await
        .expect("register b");

    assert!(created);
    assert_ne!(first.id, second.id);
    Ok(())
}
