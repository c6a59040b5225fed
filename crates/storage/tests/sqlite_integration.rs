use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::ScoreEntry;
use quiz_core::time::fixed_now;
use storage::repository::{
    KeyValueStore, KvScoreRepository, SCORES_KEY, ScoreRepository, Storage,
};
use storage::sqlite::SqliteRepository;

fn entry(title: &str, correct: u32, total: u32, offset_secs: i64) -> ScoreEntry {
    ScoreEntry::new(
        title,
        correct,
        total - correct,
        total,
        fixed_now() + Duration::seconds(offset_secs),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_overwrites_and_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate again");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("theme", "light").await.unwrap();
    repo.set("theme", "dark").await.unwrap();
    assert_eq!(repo.get("theme").await.unwrap().as_deref(), Some("dark"));

    repo.remove("theme").await.unwrap();
    assert_eq!(repo.get("theme").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_scores_are_visible_to_the_next_read() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_scores?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let kv: Arc<dyn KeyValueStore> = Arc::new(repo);
    let scores = KvScoreRepository::new(Arc::clone(&kv));

    let first = vec![entry("Topic A", 1, 2, 0)];
    scores.save_scores(&first).await.unwrap();
    assert_eq!(scores.load_scores().await.unwrap().entries, first);

    let second = vec![entry("Topic B", 2, 2, 10), entry("Topic A", 1, 2, 0)];
    scores.save_scores(&second).await.unwrap();
    assert_eq!(scores.load_scores().await.unwrap().entries, second);

    let raw = kv.get(SCORES_KEY).await.unwrap().unwrap();
    assert!(raw.starts_with('['));
    assert!(raw.contains("\"errores\":0"));
}

#[tokio::test]
async fn storage_sqlite_wires_scores_to_kv() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .scores
        .save_scores(&[entry("Topic A", 3, 4, 0)])
        .await
        .unwrap();

    assert!(storage.kv.get(SCORES_KEY).await.unwrap().is_some());
    assert_eq!(storage.scores.load_scores().await.unwrap().entries.len(), 1);
}
