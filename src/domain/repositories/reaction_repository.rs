//! Repository trait for likes and dislikes.

use crate::domain::entities::Reaction;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository interface for [`Reaction`] records, unique per `(user_id, snippet_id)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn find(&self, user_id: i64, snippet_id: Uuid) -> Result<Option<Reaction>, AppError>;

    /// Inserts a new reaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the user already reacted to the snippet.
    async fn insert(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> Result<Reaction, AppError>;

    /// Overwrites `is_like` on an existing reaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the reaction was removed meanwhile.
    async fn update(&self, id: i64, is_like: bool) -> Result<Reaction, AppError>;

    /// Removes the user's reaction. Returns `Ok(false)` if there was none.
    async fn delete(&self, user_id: i64, snippet_id: Uuid) -> Result<bool, AppError>;
}
