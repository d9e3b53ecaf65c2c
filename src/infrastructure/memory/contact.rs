//! In-memory contact messages and newsletter subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, paginate, to_i64, unique_violation};
use crate::domain::entities::{
    Contact, ContactPatch, DeletedSubscriber, NewContact, Subscriber,
};
use crate::domain::repositories::{ContactRepository, SubscriberRepository};
use crate::error::AppError;
use serde_json::json;

pub struct MemoryContactRepository {
    store: MemoryStore,
}

impl MemoryContactRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn create(&self, new_contact: NewContact) -> Result<Contact, AppError> {
        let mut tables = self.store.lock();
        let contact = Contact {
            id: tables.contacts.allocate_id(),
            name: new_contact.name,
            phone: new_contact.phone,
            email: new_contact.email,
            subject: new_contact.subject,
            message: new_contact.message,
            created_at: Utc::now(),
            is_read: false,
            is_archived: false,
        };
        tables.contacts.rows.push(contact.clone());
        Ok(contact)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError> {
        let tables = self.store.lock();
        Ok(tables.contacts.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Contact>, AppError> {
        let tables = self.store.lock();
        Ok(paginate(
            tables.contacts.rows.iter().rev().cloned(),
            page,
            page_size,
        ))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(to_i64(self.store.lock().contacts.rows.len()))
    }

    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, AppError> {
        let mut tables = self.store.lock();
        let contact = tables
            .contacts
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Contact not found", json!({ "id": id })))?;

        if let Some(is_read) = patch.is_read {
            contact.is_read = is_read;
        }
        if let Some(is_archived) = patch.is_archived {
            contact.is_archived = is_archived;
        }
        Ok(contact.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.contacts.rows.len();
        tables.contacts.rows.retain(|c| c.id != id);
        Ok(tables.contacts.rows.len() < before)
    }
}

pub struct MemorySubscriberRepository {
    store: MemoryStore,
}

impl MemorySubscriberRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SubscriberRepository for MemorySubscriberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .subscribers
            .rows
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Subscriber>, AppError> {
        let tables = self.store.lock();
        Ok(tables.subscribers.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn subscribe(&self, email: &str, now: DateTime<Utc>) -> Result<Subscriber, AppError> {
        let mut tables = self.store.lock();
        if tables.subscribers.rows.iter().any(|s| s.email == email) {
            return Err(unique_violation("newsletter_subscribers_email_key"));
        }

        tables.deleted_subscribers.rows.retain(|d| d.email != email);
        let subscriber = Subscriber {
            id: tables.subscribers.allocate_id(),
            email: email.to_string(),
            subscribed_at: now,
            is_active: true,
        };
        tables.subscribers.rows.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn unsubscribe(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DeletedSubscriber>, AppError> {
        let mut tables = self.store.lock();
        let before = tables.subscribers.rows.len();
        tables.subscribers.rows.retain(|s| s.email != email);
        if tables.subscribers.rows.len() == before {
            return Ok(None);
        }

        tables.deleted_subscribers.rows.retain(|d| d.email != email);
        let deleted = DeletedSubscriber {
            id: tables.deleted_subscribers.allocate_id(),
            email: email.to_string(),
            unsubscribed_at: now,
            deleted_at: now,
        };
        tables.deleted_subscribers.rows.push(deleted.clone());
        Ok(Some(deleted))
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Subscriber>, AppError> {
        let tables = self.store.lock();
        let mut rows = tables.subscribers.rows.clone();
        rows.sort_by(|a, b| (b.subscribed_at, b.id).cmp(&(a.subscribed_at, a.id)));
        Ok(paginate(rows, page, page_size))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(to_i64(self.store.lock().subscribers.rows.len()))
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<Subscriber, AppError> {
        let mut tables = self.store.lock();
        if tables
            .subscribers
            .rows
            .iter()
            .any(|s| s.email == email && s.id != id)
        {
            return Err(unique_violation("newsletter_subscribers_email_key"));
        }

        let subscriber = tables
            .subscribers
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Subscriber not found", json!({ "id": id })))?;
        subscriber.email = email.to_string();
        Ok(subscriber.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.subscribers.rows.len();
        tables.subscribers.rows.retain(|s| s.id != id);
        Ok(tables.subscribers.rows.len() < before)
    }

    async fn find_deleted_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DeletedSubscriber>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .deleted_subscribers
            .rows
            .iter()
            .find(|d| d.email == email)
            .cloned())
    }

    async fn find_deleted_by_id(&self, id: i64) -> Result<Option<DeletedSubscriber>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .deleted_subscribers
            .rows
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn list_deleted(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<DeletedSubscriber>, AppError> {
        let tables = self.store.lock();
        let mut rows = tables.deleted_subscribers.rows.clone();
        rows.sort_by(|a, b| (b.deleted_at, b.id).cmp(&(a.deleted_at, a.id)));
        Ok(paginate(rows, page, page_size))
    }

    async fn count_deleted(&self) -> Result<i64, AppError> {
        Ok(to_i64(self.store.lock().deleted_subscribers.rows.len()))
    }

    async fn delete_deleted(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.deleted_subscribers.rows.len();
        tables.deleted_subscribers.rows.retain(|d| d.id != id);
        Ok(tables.deleted_subscribers.rows.len() < before)
    }

    async fn clear_deleted(&self) -> Result<u64, AppError> {
        let mut tables = self.store.lock();
        let count = tables.deleted_subscribers.rows.len();
        tables.deleted_subscribers.rows.clear();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsubscribe_then_subscribe_removes_tombstone() {
        let repo = MemorySubscriberRepository::new(MemoryStore::new());
        let now = Utc::now();

        repo.subscribe("a@example.com", now).await.unwrap();
        let deleted = repo.unsubscribe("a@example.com", now).await.unwrap();
        assert!(deleted.is_some());
        assert!(repo.find_by_email("a@example.com").await.unwrap().is_none());

        repo.subscribe("a@example.com", now).await.unwrap();
        assert!(
            repo.find_deleted_by_email("a@example.com")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_returns_none() {
        let repo = MemorySubscriberRepository::new(MemoryStore::new());
        let result = repo.unsubscribe("x@example.com", Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_clear_deleted_counts() {
        let repo = MemorySubscriberRepository::new(MemoryStore::new());
        let now = Utc::now();
        for email in ["a@example.com", "b@example.com"] {
            repo.subscribe(email, now).await.unwrap();
            repo.unsubscribe(email, now).await.unwrap();
        }

        assert_eq!(repo.clear_deleted().await.unwrap(), 2);
        assert_eq!(repo.count_deleted().await.unwrap(), 0);
    }
}
