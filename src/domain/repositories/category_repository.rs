//! Repository trait for categories.

use crate::domain::entities::{Category, CategoryPatch, CategoryStats, NewCategory};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for managing categories.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCategoryRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryCategoryRepository`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_category.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Creates a new category.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug or name is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError>;

    /// Case-insensitive name check, ignoring the row `exclude_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError>;

    /// Lists categories ordered by name.
    ///
    /// # Arguments
    ///
    /// - `search` - Optional case-insensitive match on name, slug or description
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        search: Option<String>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Category>, AppError>;

    async fn count(&self, search: Option<String>) -> Result<i64, AppError>;

    /// Partially updates a category. `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category has this id.
    /// Returns [`AppError::Conflict`] if the new slug or name is taken.
    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, AppError>;

    /// Deletes a category. Snippets in it keep existing with no category.
    ///
    /// Returns `Ok(false)` if nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Snippet counts for one category.
    async fn stats(&self, id: Uuid) -> Result<CategoryStats, AppError>;
}
