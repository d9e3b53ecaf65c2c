//! Contact form submissions.

use std::sync::Arc;

use crate::domain::entities::{Contact, ContactPatch, NewContact};
use crate::domain::events::{DomainEvent, EventPublisher};
use crate::domain::repositories::ContactRepository;
use crate::error::AppError;
use serde_json::json;

pub struct ContactService<R: ContactRepository + ?Sized> {
    contact_repository: Arc<R>,
    events: EventPublisher,
}

impl<R: ContactRepository + ?Sized> ContactService<R> {
    pub fn new(contact_repository: Arc<R>, events: EventPublisher) -> Self {
        Self {
            contact_repository,
            events,
        }
    }

    /// Stores a submission and publishes [`DomainEvent::ContactSubmitted`].
    ///
    /// Field formats are checked at the API boundary; this only trims.
    pub async fn create(&self, mut new_contact: NewContact) -> Result<Contact, AppError> {
        new_contact.name = new_contact.name.trim().to_string();
        new_contact.email = new_contact.email.trim().to_string();
        new_contact.subject = new_contact.subject.trim().to_string();
        new_contact.phone = new_contact
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let contact = self.contact_repository.create(new_contact).await?;
        tracing::info!(contact_id = contact.id, "Contact submission received");

        self.events.publish(DomainEvent::ContactSubmitted {
            contact_id: contact.id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            subject: contact.subject.clone(),
        });

        Ok(contact)
    }

    /// Lists submissions, newest first, with the total count.
    pub async fn list(&self, page: i64, page_size: i64) -> Result<(Vec<Contact>, i64), AppError> {
        let items = self.contact_repository.list(page, page_size).await?;
        let total = self.contact_repository.count().await?;
        Ok((items, total))
    }

    pub async fn get(&self, id: i64) -> Result<Contact, AppError> {
        self.contact_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Contact not found", json!({ "id": id })))
    }

    pub async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, AppError> {
        self.contact_repository.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.contact_repository.delete(id).await? {
            return Err(AppError::not_found("Contact not found", json!({ "id": id })));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockContactRepository;
    use chrono::Utc;

    fn stored(id: i64, new: NewContact) -> Contact {
        Contact {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            subject: new.subject,
            message: new.message,
            created_at: Utc::now(),
            is_read: false,
            is_archived: false,
        }
    }

    fn input() -> NewContact {
        NewContact {
            name: " Ann ".to_string(),
            phone: Some("  ".to_string()),
            email: "ann@example.com ".to_string(),
            subject: "Hello".to_string(),
            message: "Hi there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_publishes_event() {
        let mut repo = MockContactRepository::new();
        repo.expect_create()
            .withf(|new| new.name == "Ann" && new.phone.is_none())
            .times(1)
            .returning(|new| Ok(stored(42, new)));

        let (events, mut rx) = EventPublisher::channel(8);
        let service = ContactService::new(Arc::new(repo), events);

        let contact = service.create(input()).await.unwrap();
        assert_eq!(contact.id, 42);

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            DomainEvent::ContactSubmitted {
                contact_id: 42,
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                subject: "Hello".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_failure_publishes_nothing() {
        let mut repo = MockContactRepository::new();
        repo.expect_create()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (events, mut rx) = EventPublisher::channel(8);
        let service = ContactService::new(Arc::new(repo), events);

        assert!(service.create(input()).await.is_err());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut repo = MockContactRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let (events, _rx) = EventPublisher::channel(8);
        let service = ContactService::new(Arc::new(repo), events);

        let result = service.delete(7).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }
}
