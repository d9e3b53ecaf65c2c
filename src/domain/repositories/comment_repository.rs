//! Repository trait for snippet comments.

use crate::domain::entities::{Comment, CommentPatch, NewComment};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Creates a comment or reply.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the snippet or parent no longer exists.
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// All comments of a snippet, oldest first.
    async fn list_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Comment>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no comment has this id.
    async fn update(&self, id: i64, patch: CommentPatch) -> Result<Comment, AppError>;

    /// Deletes a comment and its replies.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
