//! Repository trait for the code-run log.

use crate::domain::entities::{CodeRun, NewCodeRun};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunRepository: Send + Sync {
    async fn create(&self, new_run: NewCodeRun) -> Result<CodeRun, AppError>;

    /// Runs of a snippet, newest first.
    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<CodeRun>, AppError>;

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError>;
}
