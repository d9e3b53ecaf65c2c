//! Repository trait for per-user view history.

use crate::domain::entities::{HistoryEntry, NewHistoryEntry};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository interface for [`HistoryEntry`] records.
///
/// The pair `(user_id, snippet_id)` is unique. Counter updates are performed
/// by the store in a single statement so concurrent views never lose an
/// increment.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgHistoryRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryHistoryRepository`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn find(&self, user_id: i64, snippet_id: Uuid)
    -> Result<Option<HistoryEntry>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryEntry>, AppError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a record for the pair already exists.
    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, AppError>;

    /// Applies `view_count = view_count + 1, last_viewed = now` to the record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` with the updated record
    /// - `Ok(None)` if no record exists for the pair
    async fn increment_view(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError>;

    /// Sets the saved flag.
    ///
    /// Saving keeps an existing `saved_at` and otherwise stamps `now`;
    /// unsaving clears it. Returns `Ok(None)` if no record exists for the pair.
    async fn update_saved(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_saved: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError>;

    /// Lists a user's history, most recently viewed first.
    async fn list_for_user(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<HistoryEntry>, AppError>;

    async fn count_for_user(&self, user_id: i64) -> Result<i64, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
