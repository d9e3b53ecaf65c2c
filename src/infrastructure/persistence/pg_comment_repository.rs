//! PostgreSQL implementation of the comment repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Comment, CommentPatch, NewComment};
use crate::domain::repositories::CommentRepository;
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str =
    "id, user_id, snippet_id, parent_id, text, is_resolved, created_at, updated_at";

pub struct PgCommentRepository {
    pool: Arc<PgPool>,
}

impl PgCommentRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (user_id, snippet_id, parent_id, text)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(new_comment.user_id)
        .bind(new_comment.snippet_id)
        .bind(new_comment.parent_id)
        .bind(&new_comment.text)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let comment =
            sqlx::query_as::<_, Comment>(&format!("SELECT {COLUMNS} FROM comments WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(comment)
    }

    async fn list_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COLUMNS} FROM comments
             WHERE snippet_id = $1
             ORDER BY created_at, id"
        ))
        .bind(snippet_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: i64, patch: CommentPatch) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments
             SET text = COALESCE($2, text),
                 is_resolved = COALESCE($3, is_resolved),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(patch.text)
        .bind(patch.is_resolved)
        .fetch_optional(self.pool.as_ref())
        .await?;

        comment.ok_or_else(|| AppError::not_found("Comment not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
