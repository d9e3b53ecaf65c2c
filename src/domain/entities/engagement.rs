//! Per-user engagement records: view history and reactions.
//!
//! Both records are keyed by `(user_id, snippet_id)` and the store enforces
//! that pair as unique. Mutations go through
//! [`crate::application::services::EngagementService`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user's view history for one snippet.
///
/// Invariants:
/// - `view_count >= 1`, starting at 1 on creation
/// - `saved_at` is `Some` exactly when `is_saved` is true
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub snippet_id: Uuid,
    pub view_count: i64,
    pub last_viewed: DateTime<Utc>,
    pub is_saved: bool,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Input data for creating a history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub user_id: i64,
    pub snippet_id: Uuid,
    pub view_count: i64,
    pub last_viewed: DateTime<Utc>,
    pub is_saved: bool,
    pub saved_at: Option<DateTime<Utc>>,
}

impl NewHistoryEntry {
    /// A first view at `now`.
    pub fn first_view(user_id: i64, snippet_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            snippet_id,
            view_count: 1,
            last_viewed: now,
            is_saved: false,
            saved_at: None,
        }
    }
}

/// A user's like or dislike on a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Reaction {
    pub id: i64,
    pub user_id: i64,
    pub snippet_id: Uuid,
    pub is_like: bool,
    pub created_at: DateTime<Utc>,
}
