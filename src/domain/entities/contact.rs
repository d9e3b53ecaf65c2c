//! Contact messages and newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub is_archived: bool,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub is_read: Option<bool>,
    pub is_archived: Option<bool>,
}

/// An active newsletter subscription. `email` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Tombstone of an unsubscribed address. `email` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DeletedSubscriber {
    pub id: i64,
    pub email: String,
    pub unsubscribed_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}
