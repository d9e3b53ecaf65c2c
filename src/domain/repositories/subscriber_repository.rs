//! Repository trait for newsletter subscribers and their tombstones.

use crate::domain::entities::{DeletedSubscriber, Subscriber};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for active and deleted newsletter subscribers.
///
/// An address lives in at most one of the two tables. Moving between them is
/// done in a single transaction by [`subscribe`](Self::subscribe) and
/// [`unsubscribe`](Self::unsubscribe).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSubscriberRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemorySubscriberRepository`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Subscriber>, AppError>;

    /// Creates an active subscriber and drops any tombstone for the address.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the address is already subscribed.
    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> Result<Subscriber, AppError>;

    /// Moves an active subscriber into the deleted table.
    ///
    /// Returns `Ok(None)` if the address has no active subscription.
    async fn unsubscribe(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DeletedSubscriber>, AppError>;

    /// Lists active subscribers, newest first.
    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Subscriber>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no subscriber has this id.
    /// Returns [`AppError::Conflict`] if the new address is already subscribed.
    async fn update_email(&self, id: i64, email: &str) -> Result<Subscriber, AppError>;

    /// Hard-deletes an active subscriber without leaving a tombstone.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn find_deleted_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DeletedSubscriber>, AppError>;

    async fn find_deleted_by_id(&self, id: i64) -> Result<Option<DeletedSubscriber>, AppError>;

    /// Lists tombstones, most recently deleted first.
    async fn list_deleted(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<DeletedSubscriber>, AppError>;

    async fn count_deleted(&self) -> Result<i64, AppError>;

    async fn delete_deleted(&self, id: i64) -> Result<bool, AppError>;

    /// Removes every tombstone and returns how many were removed.
    async fn clear_deleted(&self) -> Result<u64, AppError>;
}
