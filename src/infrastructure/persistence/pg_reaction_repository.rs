//! PostgreSQL implementation of the reaction repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Reaction;
use crate::domain::repositories::ReactionRepository;
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str = "id, user_id, snippet_id, is_like, created_at";

pub struct PgReactionRepository {
    pool: Arc<PgPool>,
}

impl PgReactionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    async fn find(&self, user_id: i64, snippet_id: Uuid) -> Result<Option<Reaction>, AppError> {
        let reaction = sqlx::query_as::<_, Reaction>(&format!(
            "SELECT {COLUMNS} FROM reactions WHERE user_id = $1 AND snippet_id = $2"
        ))
        .bind(user_id)
        .bind(snippet_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(reaction)
    }

    async fn insert(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> Result<Reaction, AppError> {
        let reaction = sqlx::query_as::<_, Reaction>(&format!(
            "INSERT INTO reactions (user_id, snippet_id, is_like, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(snippet_id)
        .bind(is_like)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(reaction)
    }

    async fn update(&self, id: i64, is_like: bool) -> Result<Reaction, AppError> {
        let reaction = sqlx::query_as::<_, Reaction>(&format!(
            "UPDATE reactions SET is_like = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(is_like)
        .fetch_optional(self.pool.as_ref())
        .await?;

        reaction.ok_or_else(|| AppError::not_found("Reaction not found", json!({ "id": id })))
    }

    async fn delete(&self, user_id: i64, snippet_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reactions WHERE user_id = $1 AND snippet_id = $2")
            .bind(user_id)
            .bind(snippet_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
