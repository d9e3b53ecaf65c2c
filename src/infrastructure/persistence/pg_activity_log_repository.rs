//! PostgreSQL implementations of the share and code-run logs.
//!
//! IP addresses are stored as `INET` and read back through `host()` so the
//! entities carry plain strings.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{CodeRun, NewCodeRun, NewShare, Share};
use crate::domain::repositories::{RunRepository, ShareRepository};
use crate::error::AppError;

const SHARE_COLUMNS: &str =
    "id, user_id, snippet_id, share_method, shared_to, shared_at, host(ip_address) AS ip_address";

const RUN_COLUMNS: &str = "id, user_id, snippet_id, run_at, was_modified, execution_time_ms, \
    user_agent, host(ip_address) AS ip_address";

pub struct PgShareRepository {
    pool: Arc<PgPool>,
}

impl PgShareRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn create(&self, new_share: NewShare) -> Result<Share, AppError> {
        let share = sqlx::query_as::<_, Share>(&format!(
            "INSERT INTO shares (user_id, snippet_id, share_method, shared_to, ip_address)
             VALUES ($1, $2, $3, $4, $5::inet)
             RETURNING {SHARE_COLUMNS}"
        ))
        .bind(new_share.user_id)
        .bind(new_share.snippet_id)
        .bind(new_share.share_method.as_str())
        .bind(&new_share.shared_to)
        .bind(&new_share.ip_address)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(share)
    }

    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Share>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, Share>(&format!(
            "SELECT {SHARE_COLUMNS} FROM shares
             WHERE snippet_id = $1
             ORDER BY shared_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(snippet_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shares WHERE snippet_id = $1")
                .bind(snippet_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}

pub struct PgRunRepository {
    pool: Arc<PgPool>,
}

impl PgRunRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunRepository for PgRunRepository {
    async fn create(&self, new_run: NewCodeRun) -> Result<CodeRun, AppError> {
        let run = sqlx::query_as::<_, CodeRun>(&format!(
            "INSERT INTO code_runs
                (user_id, snippet_id, was_modified, execution_time_ms, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6::inet)
             RETURNING {RUN_COLUMNS}"
        ))
        .bind(new_run.user_id)
        .bind(new_run.snippet_id)
        .bind(new_run.was_modified)
        .bind(new_run.execution_time_ms)
        .bind(&new_run.user_agent)
        .bind(&new_run.ip_address)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(run)
    }

    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<CodeRun>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, CodeRun>(&format!(
            "SELECT {RUN_COLUMNS} FROM code_runs
             WHERE snippet_id = $1
             ORDER BY run_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(snippet_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM code_runs WHERE snippet_id = $1")
                .bind(snippet_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
