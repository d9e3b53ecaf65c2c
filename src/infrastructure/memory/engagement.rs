//! In-memory view history and reactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MemoryStore, paginate, to_i64, unique_violation};
use crate::domain::entities::{HistoryEntry, NewHistoryEntry, Reaction};
use crate::domain::repositories::{HistoryRepository, ReactionRepository};
use crate::error::AppError;
use serde_json::json;

pub struct MemoryHistoryRepository {
    store: MemoryStore,
}

impl MemoryHistoryRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HistoryRepository for MemoryHistoryRepository {
    async fn find(
        &self,
        user_id: i64,
        snippet_id: Uuid,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .history
            .rows
            .iter()
            .find(|h| h.user_id == user_id && h.snippet_id == snippet_id)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<HistoryEntry>, AppError> {
        let tables = self.store.lock();
        Ok(tables.history.rows.iter().find(|h| h.id == id).cloned())
    }

    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, AppError> {
        let mut tables = self.store.lock();
        if tables
            .history
            .rows
            .iter()
            .any(|h| h.user_id == entry.user_id && h.snippet_id == entry.snippet_id)
        {
            return Err(unique_violation("history_entries_user_snippet_key"));
        }
        if !tables.snippets.rows.iter().any(|s| s.id == entry.snippet_id) {
            return Err(AppError::bad_request(
                "Referenced entity does not exist",
                json!({ "constraint": "history_entries_snippet_id_fkey" }),
            ));
        }

        let row = HistoryEntry {
            id: tables.history.allocate_id(),
            user_id: entry.user_id,
            snippet_id: entry.snippet_id,
            view_count: entry.view_count,
            last_viewed: entry.last_viewed,
            is_saved: entry.is_saved,
            saved_at: entry.saved_at,
        };
        tables.history.rows.push(row.clone());
        Ok(row)
    }

    async fn increment_view(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let mut tables = self.store.lock();
        Ok(tables
            .history
            .rows
            .iter_mut()
            .find(|h| h.user_id == user_id && h.snippet_id == snippet_id)
            .map(|h| {
                h.view_count += 1;
                h.last_viewed = now;
                h.clone()
            }))
    }

    async fn update_saved(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_saved: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<HistoryEntry>, AppError> {
        let mut tables = self.store.lock();
        Ok(tables
            .history
            .rows
            .iter_mut()
            .find(|h| h.user_id == user_id && h.snippet_id == snippet_id)
            .map(|h| {
                h.is_saved = is_saved;
                h.saved_at = if is_saved { h.saved_at.or(Some(now)) } else { None };
                h.clone()
            }))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let tables = self.store.lock();
        let mut rows: Vec<HistoryEntry> = tables
            .history
            .rows
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.last_viewed, b.id).cmp(&(a.last_viewed, a.id)));
        Ok(paginate(rows, page, page_size))
    }

    async fn count_for_user(&self, user_id: i64) -> Result<i64, AppError> {
        let tables = self.store.lock();
        Ok(to_i64(
            tables.history.rows.iter().filter(|h| h.user_id == user_id).count(),
        ))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.history.rows.len();
        tables.history.rows.retain(|h| h.id != id);
        Ok(tables.history.rows.len() < before)
    }
}

pub struct MemoryReactionRepository {
    store: MemoryStore,
}

impl MemoryReactionRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReactionRepository for MemoryReactionRepository {
    async fn find(&self, user_id: i64, snippet_id: Uuid) -> Result<Option<Reaction>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .reactions
            .rows
            .iter()
            .find(|r| r.user_id == user_id && r.snippet_id == snippet_id)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> Result<Reaction, AppError> {
        let mut tables = self.store.lock();
        if tables
            .reactions
            .rows
            .iter()
            .any(|r| r.user_id == user_id && r.snippet_id == snippet_id)
        {
            return Err(unique_violation("reactions_user_snippet_key"));
        }
        if !tables.snippets.rows.iter().any(|s| s.id == snippet_id) {
            return Err(AppError::bad_request(
                "Referenced entity does not exist",
                json!({ "constraint": "reactions_snippet_id_fkey" }),
            ));
        }

        let reaction = Reaction {
            id: tables.reactions.allocate_id(),
            user_id,
            snippet_id,
            is_like,
            created_at: now,
        };
        tables.reactions.rows.push(reaction.clone());
        Ok(reaction)
    }

    async fn update(&self, id: i64, is_like: bool) -> Result<Reaction, AppError> {
        let mut tables = self.store.lock();
        let reaction = tables
            .reactions
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("Reaction not found", json!({ "id": id })))?;
        reaction.is_like = is_like;
        Ok(reaction.clone())
    }

    async fn delete(&self, user_id: i64, snippet_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.reactions.rows.len();
        tables
            .reactions
            .rows
            .retain(|r| !(r.user_id == user_id && r.snippet_id == snippet_id));
        Ok(tables.reactions.rows.len() < before)
    }
}
