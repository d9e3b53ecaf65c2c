//! Repository trait for the share log.

use crate::domain::entities::{NewShare, Share};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareRepository: Send + Sync {
    async fn create(&self, new_share: NewShare) -> Result<Share, AppError>;

    /// Shares of a snippet, newest first.
    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Share>, AppError>;

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError>;
}
