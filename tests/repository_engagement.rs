mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use codehub::domain::entities::NewHistoryEntry;
use codehub::domain::repositories::{HistoryRepository, ReactionRepository};
use codehub::infrastructure::persistence::{PgHistoryRepository, PgReactionRepository};

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_history_insert_and_increment(pool: PgPool) {
    let snippet_id = common::insert_test_snippet(&pool, "Quick Sort", "quick-sort").await;
    let repo = PgHistoryRepository::new(Arc::new(pool));
    let now = Utc::now();

    assert!(repo.increment_view(1, snippet_id, now).await.unwrap().is_none());

    let entry = repo
        .insert(NewHistoryEntry::first_view(1, snippet_id, now))
        .await
        .unwrap();
    assert_eq!(entry.view_count, 1);

    let later = now + Duration::seconds(5);
    let entry = repo
        .increment_view(1, snippet_id, later)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.view_count, 2);
    assert_eq!(entry.last_viewed.timestamp(), later.timestamp());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_history_pair_is_unique(pool: PgPool) {
    let snippet_id = common::insert_test_snippet(&pool, "Quick Sort", "quick-sort").await;
    let repo = PgHistoryRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.insert(NewHistoryEntry::first_view(1, snippet_id, now))
        .await
        .unwrap();
    let err = repo
        .insert(NewHistoryEntry::first_view(1, snippet_id, now))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_history_saved_flag(pool: PgPool) {
    let snippet_id = common::insert_test_snippet(&pool, "Quick Sort", "quick-sort").await;
    let repo = PgHistoryRepository::new(Arc::new(pool));
    let now = Utc::now();
    repo.insert(NewHistoryEntry::first_view(1, snippet_id, now))
        .await
        .unwrap();

    let saved = repo
        .update_saved(1, snippet_id, true, now)
        .await
        .unwrap()
        .unwrap();
    assert!(saved.is_saved);
    let saved_at = saved.saved_at.unwrap();

    let again = repo
        .update_saved(1, snippet_id, true, now + Duration::minutes(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.saved_at, Some(saved_at));

    let unsaved = repo
        .update_saved(1, snippet_id, false, now)
        .await
        .unwrap()
        .unwrap();
    assert!(!unsaved.is_saved);
    assert_eq!(unsaved.saved_at, None);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_history_list_for_user(pool: PgPool) {
    let first = common::insert_test_snippet(&pool, "Quick Sort", "quick-sort").await;
    let second = common::insert_test_snippet(&pool, "Merge Sort", "merge-sort").await;
    let repo = PgHistoryRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.insert(NewHistoryEntry::first_view(1, first, now))
        .await
        .unwrap();
    repo.insert(NewHistoryEntry::first_view(1, second, now + Duration::seconds(1)))
        .await
        .unwrap();
    repo.insert(NewHistoryEntry::first_view(2, first, now))
        .await
        .unwrap();

    let entries = repo.list_for_user(1, 1, 10).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].snippet_id, second);
    assert_eq!(repo.count_for_user(1).await.unwrap(), 2);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_reaction_lifecycle(pool: PgPool) {
    let snippet_id = common::insert_test_snippet(&pool, "Quick Sort", "quick-sort").await;
    let repo = PgReactionRepository::new(Arc::new(pool));
    let now = Utc::now();

    let reaction = repo.insert(1, snippet_id, true, now).await.unwrap();
    assert!(reaction.is_like);

    let err = repo.insert(1, snippet_id, false, now).await.unwrap_err();
    assert!(err.is_conflict());

    let flipped = repo.update(reaction.id, false).await.unwrap();
    assert!(!flipped.is_like);
    assert_eq!(
        repo.find(1, snippet_id).await.unwrap().map(|r| r.id),
        Some(reaction.id)
    );

    assert!(repo.delete(1, snippet_id).await.unwrap());
    assert!(!repo.delete(1, snippet_id).await.unwrap());
}
