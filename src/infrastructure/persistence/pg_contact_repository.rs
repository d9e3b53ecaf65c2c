//! PostgreSQL implementation of the contact repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Contact, ContactPatch, NewContact};
use crate::domain::repositories::ContactRepository;
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str =
    "id, name, phone, email, subject, message, created_at, is_read, is_archived";

pub struct PgContactRepository {
    pool: Arc<PgPool>,
}

impl PgContactRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, new_contact: NewContact) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (name, phone, email, subject, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(&new_contact.name)
        .bind(&new_contact.phone)
        .bind(&new_contact.email)
        .bind(&new_contact.subject)
        .bind(&new_contact.message)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(contact)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError> {
        let contact =
            sqlx::query_as::<_, Contact>(&format!("SELECT {COLUMNS} FROM contacts WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(contact)
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Contact>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {COLUMNS} FROM contacts
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "UPDATE contacts
             SET is_read = COALESCE($2, is_read),
                 is_archived = COALESCE($3, is_archived)
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(patch.is_read)
        .bind(patch.is_archived)
        .fetch_optional(self.pool.as_ref())
        .await?;

        contact.ok_or_else(|| AppError::not_found("Contact not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
