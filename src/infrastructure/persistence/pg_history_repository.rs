//! PostgreSQL implementation of the view history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{HistoryEntry, NewHistoryEntry};
use crate::domain::repositories::HistoryRepository;
use crate::error::AppError;

const COLUMNS: &str = "id, user_id, snippet_id, view_count, last_viewed, is_saved, saved_at";

/// PostgreSQL repository for per-user view history.
///
/// Counter updates are single `UPDATE` statements so concurrent views of the
/// same snippet never lose an increment.
pub struct PgHistoryRepository {
    pool: Arc<PgPool>,
}

impl PgHistoryRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn find(
        &self,
        user_id: i64,
        snippet_id: Uuid,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            "SELECT {COLUMNS} FROM history_entries WHERE user_id = $1 AND snippet_id = $2"
        ))
        .bind(user_id)
        .bind(snippet_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            "SELECT {COLUMNS} FROM history_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            "INSERT INTO history_entries
                (user_id, snippet_id, view_count, last_viewed, is_saved, saved_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(entry.user_id)
        .bind(entry.snippet_id)
        .bind(entry.view_count)
        .bind(entry.last_viewed)
        .bind(entry.is_saved)
        .bind(entry.saved_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn increment_view(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            "UPDATE history_entries
             SET view_count = view_count + 1, last_viewed = $3
             WHERE user_id = $1 AND snippet_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(snippet_id)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn update_saved(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_saved: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            "UPDATE history_entries
             SET is_saved = $3,
                 saved_at = CASE WHEN $3 THEN COALESCE(saved_at, $4) ELSE NULL END
             WHERE user_id = $1 AND snippet_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(snippet_id)
        .bind(is_saved)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, HistoryEntry>(&format!(
            "SELECT {COLUMNS} FROM history_entries
             WHERE user_id = $1
             ORDER BY last_viewed DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count_for_user(&self, user_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history_entries WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM history_entries WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
