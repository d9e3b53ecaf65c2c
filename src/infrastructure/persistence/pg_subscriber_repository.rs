//! PostgreSQL implementation of the newsletter subscriber repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{DeletedSubscriber, Subscriber};
use crate::domain::repositories::SubscriberRepository;
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str = "id, email, subscribed_at, is_active";
const DELETED_COLUMNS: &str = "id, email, unsubscribed_at, deleted_at";

/// PostgreSQL repository for `newsletter_subscribers` and `deleted_subscribers`.
///
/// Moves between the two tables run in one transaction.
pub struct PgSubscriberRepository {
    pool: Arc<PgPool>,
}

impl PgSubscriberRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepository for PgSubscriberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {COLUMNS} FROM newsletter_subscribers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(subscriber)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Subscriber>, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {COLUMNS} FROM newsletter_subscribers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(subscriber)
    }

    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> Result<Subscriber, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM deleted_subscribers WHERE email = $1")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
            "INSERT INTO newsletter_subscribers (email, subscribed_at, is_active)
             VALUES ($1, $2, TRUE)
             RETURNING {COLUMNS}"
        ))
        .bind(email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(subscriber)
    }

    async fn unsubscribe(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DeletedSubscriber>, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_scalar::<_, i64>(
            "DELETE FROM newsletter_subscribers WHERE email = $1 RETURNING id",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_none() {
            return Ok(None);
        }

        let deleted = sqlx::query_as::<_, DeletedSubscriber>(&format!(
            "INSERT INTO deleted_subscribers (email, unsubscribed_at, deleted_at)
             VALUES ($1, $2, $2)
             ON CONFLICT (email) DO UPDATE
                SET unsubscribed_at = EXCLUDED.unsubscribed_at,
                    deleted_at = EXCLUDED.deleted_at
             RETURNING {DELETED_COLUMNS}"
        ))
        .bind(email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(deleted))
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Subscriber>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {COLUMNS} FROM newsletter_subscribers
             ORDER BY subscribed_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM newsletter_subscribers")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<Subscriber, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
            "UPDATE newsletter_subscribers SET email = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        subscriber.ok_or_else(|| AppError::not_found("Subscriber not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM newsletter_subscribers WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_deleted_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DeletedSubscriber>, AppError> {
        let deleted = sqlx::query_as::<_, DeletedSubscriber>(&format!(
            "SELECT {DELETED_COLUMNS} FROM deleted_subscribers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(deleted)
    }

    async fn find_deleted_by_id(&self, id: i64) -> Result<Option<DeletedSubscriber>, AppError> {
        let deleted = sqlx::query_as::<_, DeletedSubscriber>(&format!(
            "SELECT {DELETED_COLUMNS} FROM deleted_subscribers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(deleted)
    }

    async fn list_deleted(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<DeletedSubscriber>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, DeletedSubscriber>(&format!(
            "SELECT {DELETED_COLUMNS} FROM deleted_subscribers
             ORDER BY deleted_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count_deleted(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deleted_subscribers")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn delete_deleted(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM deleted_subscribers WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_deleted(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM deleted_subscribers")
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
