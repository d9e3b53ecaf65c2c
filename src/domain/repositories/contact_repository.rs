//! Repository trait for contact form submissions.

use crate::domain::entities::{Contact, ContactPatch, NewContact};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for [`Contact`] messages.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgContactRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryContactRepository`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, new_contact: NewContact) -> Result<Contact, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError>;

    /// Lists messages, newest first.
    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Contact>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Updates the read and archived flags.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no message has this id.
    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
