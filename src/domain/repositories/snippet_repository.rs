//! Repository trait for code snippets.

use crate::domain::entities::{EngagementSummary, NewSnippet, Snippet, SnippetFilter, SnippetPatch};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository interface for managing snippets.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSnippetRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemorySnippetRepository`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_snippet.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Creates a new snippet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is already taken.
    /// Returns [`AppError::Validation`] if `category_id` references no category.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_snippet: NewSnippet) -> Result<Snippet, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Snippet>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Snippet>, AppError>;

    /// Lists snippets matching `filter`, sorted by `filter.ordering`.
    ///
    /// # Arguments
    ///
    /// - `filter` - Filters and ordering
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        filter: SnippetFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Snippet>, AppError>;

    async fn count(&self, filter: SnippetFilter) -> Result<i64, AppError>;

    /// Partially updates a snippet. `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no snippet has this id.
    /// Returns [`AppError::Conflict`] if the new slug is taken.
    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, AppError>;

    /// Deletes a snippet together with its engagement and activity rows.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Sets `last_accessed` without touching `updated_at`.
    async fn touch_accessed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;

    /// Aggregates reactions, comments, views and runs for one snippet.
    async fn engagement_summary(&self, id: Uuid) -> Result<EngagementSummary, AppError>;
}
