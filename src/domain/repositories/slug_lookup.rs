//! Read-only slug existence check used by slug generation.

use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Answers whether a slug is already taken within one entity type.
///
/// Implemented by every repository whose entity carries a unique slug.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlugLookup: Send + Sync {
    /// Returns `true` if `slug` belongs to any row other than `exclude_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError>;
}
