//! # Knowledge Store Tests
//!
//! Verifies the SQLite-backed knowledge store: schema creation, idempotent
//! seeding, the administrative reseed, and label queries against real rows.
//!
//! Each test uses its own in-memory database, so no file cleanup is needed.

mod common;

use crate::common::setup_tracing;
use petcare::{
    knowledge::{StaticKnowledgeBase, DEFAULT_CONDITIONS},
    providers::db::{sqlite::SqliteProvider, storage::KnowledgeStore},
    types::SeedOutcome,
    PetCareError,
};

async fn fresh_store() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_schema()
        .await
        .expect("Failed to create schema");
    provider
}

#[tokio::test]
async fn test_ensure_seeded_is_idempotent() {
    setup_tracing();
    let store = fresh_store().await;

    let first = store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
    assert_eq!(first, SeedOutcome::Seeded(4));

    let second = store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
    assert_eq!(second, SeedOutcome::AlreadyPresent(4));
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_schema_initialization_is_repeatable() {
    setup_tracing();
    let store = fresh_store().await;
    store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();

    // Running the schema again on startup must not drop or duplicate data.
    store.initialize_schema().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_load_returns_records_in_id_order() {
    setup_tracing();
    let store = fresh_store().await;
    store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();

    let records = store.load().await.unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.disease_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "알레르기성 피부염 (의심)",
            "백내장 (초기 의심)",
            "결막염 (의심)",
            "정상 피부"
        ]
    );
    assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(records[1].warning_level, "경고 🔴");
}

#[tokio::test]
async fn test_existing_rows_are_not_reseeded() {
    setup_tracing();
    let store = fresh_store().await;
    store
        .initialize_with_data(
            "INSERT INTO diseases (disease_name, image_labels, text_symptoms, warning_level, advice) \
             VALUES ('귀 진드기', '검은 귀지', '귀를 긁음', '주의 🟡', '귀 세정');",
        )
        .await
        .unwrap();

    let outcome = store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
    assert_eq!(outcome, SeedOutcome::AlreadyPresent(1));
    assert_eq!(store.load().await.unwrap()[0].disease_name, "귀 진드기");
}

#[tokio::test]
async fn test_reseed_restores_the_defaults() {
    setup_tracing();
    let store = fresh_store().await;
    store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
    store
        .initialize_with_data(
            "INSERT INTO diseases (disease_name, image_labels) VALUES ('임시', '임시 라벨');",
        )
        .await
        .unwrap();
    assert_eq!(store.count().await.unwrap(), 5);

    let count = store.reseed(DEFAULT_CONDITIONS).await.unwrap();
    assert_eq!(count, 4);
    assert!(store
        .load()
        .await
        .unwrap()
        .iter()
        .all(|r| r.disease_name != "임시"));
}

#[tokio::test]
async fn test_null_columns_load_as_empty_text() {
    setup_tracing();
    let store = fresh_store().await;
    store
        .initialize_with_data("INSERT INTO diseases (disease_name) VALUES ('이름만');")
        .await
        .unwrap();

    let records = store.load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_labels, "");
    assert_eq!(records[0].image_keywords().count(), 0);
    // A record without keywords never matches.
    assert!(store
        .query_by_label_substring("이름만")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_query_by_label_substring_against_sqlite() {
    setup_tracing();
    let store = fresh_store().await;
    store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();

    let matched = store
        .query_by_label_substring("등 부분에 피부 발진과 탈모가 관찰됨")
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].disease_name, "알레르기성 피부염 (의심)");

    let none = store
        .query_by_label_substring("외관상 특이 소견 없음")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_snapshot_matches_the_sqlite_table() {
    setup_tracing();
    let store = fresh_store().await;
    store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();

    let snapshot = StaticKnowledgeBase::snapshot_of(&store).await.unwrap();
    assert_eq!(snapshot.load().await.unwrap(), store.load().await.unwrap());
}

#[tokio::test]
async fn test_file_database_persists_between_providers() {
    setup_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("petcare.db");
    let path_str = path.to_str().unwrap().to_string();

    {
        let store = SqliteProvider::new(&path_str).await.unwrap();
        store.initialize_schema().await.unwrap();
        store.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
    }

    let reopened = SqliteProvider::new(&path_str).await.unwrap();
    reopened.initialize_schema().await.unwrap();
    assert_eq!(
        reopened.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap(),
        SeedOutcome::AlreadyPresent(4)
    );
}

#[tokio::test]
async fn test_failed_reseed_rolls_back_and_reports_insert_error() {
    setup_tracing();
    let store = SqliteProvider::new(":memory:").await.unwrap();
    // A legacy table without the keyword columns: the delete succeeds, the inserts fail.
    store
        .initialize_with_data(
            "CREATE TABLE diseases (id INTEGER PRIMARY KEY AUTOINCREMENT, disease_name TEXT NOT NULL);
             INSERT INTO diseases (disease_name) VALUES ('기존');",
        )
        .await
        .unwrap();

    let err = store.reseed(DEFAULT_CONDITIONS).await.unwrap_err();
    assert!(matches!(err, PetCareError::StoreUnavailable(_)));
    assert!(!err.to_string().contains("no transaction"));
    assert_eq!(store.count().await.unwrap(), 1);
}
