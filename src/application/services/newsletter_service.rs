//! Newsletter subscription lifecycle.
//!
//! An address is either active (in the subscribers table), unsubscribed (in
//! the deleted table) or unknown. Subscribing an unsubscribed address drops
//! its tombstone; unsubscribing moves the row over in one transaction.

use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::entities::{DeletedSubscriber, Subscriber};
use crate::domain::events::{DomainEvent, EventPublisher};
use crate::domain::repositories::SubscriberRepository;
use crate::error::AppError;
use serde_json::json;

pub struct NewsletterService<R: SubscriberRepository + ?Sized> {
    subscriber_repository: Arc<R>,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
}

impl<R: SubscriberRepository + ?Sized> NewsletterService<R> {
    pub fn new(
        subscriber_repository: Arc<R>,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriber_repository,
            events,
            clock,
        }
    }

    /// Subscribes an address.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the address is blank.
    /// Returns [`AppError::Conflict`] if it is already an active subscriber.
    pub async fn subscribe(&self, email: &str) -> Result<Subscriber, AppError> {
        let email = normalize_email(email)?;

        if self
            .subscriber_repository
            .find_by_email(&email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "This email is already an active subscriber",
                json!({ "email": email }),
            ));
        }

        let subscriber = self
            .subscriber_repository
            .subscribe(&email, self.clock.now())
            .await?;

        tracing::info!(subscriber_id = subscriber.id, "Newsletter subscription created");
        self.events.publish(DomainEvent::NewsletterSubscribed {
            email: subscriber.email.clone(),
        });

        Ok(subscriber)
    }

    /// Unsubscribes an address, moving it to the deleted list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the address was already unsubscribed.
    /// Returns [`AppError::NotFound`] if the address is unknown.
    pub async fn unsubscribe(&self, email: &str) -> Result<DeletedSubscriber, AppError> {
        let email = normalize_email(email)?;

        if let Some(deleted) = self
            .subscriber_repository
            .unsubscribe(&email, self.clock.now())
            .await?
        {
            tracing::info!("Newsletter subscription moved to deleted list");
            self.events.publish(DomainEvent::NewsletterUnsubscribed {
                email: deleted.email.clone(),
            });
            return Ok(deleted);
        }

        if self
            .subscriber_repository
            .find_deleted_by_email(&email)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request(
                "This email was already unsubscribed",
                json!({ "email": email }),
            ));
        }

        Err(AppError::not_found(
            "Email not found in the active subscription list",
            json!({ "email": email }),
        ))
    }

    /// Re-subscribes an address from the deleted list. Same rules as
    /// [`Self::subscribe`].
    pub async fn reactivate(&self, email: &str) -> Result<Subscriber, AppError> {
        self.subscribe(email).await
    }

    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Subscriber>, i64), AppError> {
        let items = self.subscriber_repository.list(page, page_size).await?;
        let total = self.subscriber_repository.count().await?;
        Ok((items, total))
    }

    pub async fn get(&self, id: i64) -> Result<Subscriber, AppError> {
        self.subscriber_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Subscriber not found", json!({ "id": id })))
    }

    /// Changes a subscriber's address.
    ///
    /// Deactivation is not an update: `is_active = false` is rejected in
    /// favor of [`Self::unsubscribe`].
    pub async fn update(
        &self,
        id: i64,
        email: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Subscriber, AppError> {
        if is_active == Some(false) {
            return Err(AppError::bad_request(
                "Use unsubscribe to deactivate a subscriber",
                json!({ "field": "is_active" }),
            ));
        }

        let current = self.get(id).await?;
        match email {
            Some(email) => {
                let email = normalize_email(email)?;
                if email == current.email {
                    return Ok(current);
                }
                self.subscriber_repository.update_email(id, &email).await
            }
            None => Ok(current),
        }
    }

    /// Hard-deletes an active subscriber without keeping a tombstone.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.subscriber_repository.delete(id).await? {
            return Err(AppError::not_found("Subscriber not found", json!({ "id": id })));
        }
        Ok(())
    }

    pub async fn list_deleted(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<DeletedSubscriber>, i64), AppError> {
        let items = self
            .subscriber_repository
            .list_deleted(page, page_size)
            .await?;
        let total = self.subscriber_repository.count_deleted().await?;
        Ok((items, total))
    }

    pub async fn get_deleted(&self, id: i64) -> Result<DeletedSubscriber, AppError> {
        self.subscriber_repository
            .find_deleted_by_id(id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Deleted subscriber not found", json!({ "id": id }))
            })
    }

    pub async fn delete_deleted(&self, id: i64) -> Result<(), AppError> {
        if !self.subscriber_repository.delete_deleted(id).await? {
            return Err(AppError::not_found(
                "Deleted subscriber not found",
                json!({ "id": id }),
            ));
        }
        Ok(())
    }

    /// Permanently removes every tombstone. Returns how many were removed.
    pub async fn clear_deleted(&self) -> Result<u64, AppError> {
        let count = self.subscriber_repository.clear_deleted().await?;
        tracing::info!(count, "Deleted subscribers purged");
        Ok(count)
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::bad_request(
            "Email is required",
            json!({ "field": "email" }),
        ));
    }
    Ok(email)
}
