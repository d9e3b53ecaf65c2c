//! In-memory repository implementations.
//!
//! Every repository shares one [`MemoryStore`], so cross-table rules hold the
//! same way they do in PostgreSQL: unique keys are checked under the store
//! mutex, deleting a snippet cascades to its engagement rows, and deleting a
//! category detaches its snippets.
//!
//! Used with `STORAGE_BACKEND=memory` and by the HTTP tests.

pub mod activity;
pub mod catalog;
pub mod contact;
pub mod engagement;

pub use activity::{MemoryCommentRepository, MemoryRunRepository, MemoryShareRepository};
pub use catalog::{MemoryCategoryRepository, MemorySnippetRepository};
pub use contact::{MemoryContactRepository, MemorySubscriberRepository};
pub use engagement::{MemoryHistoryRepository, MemoryReactionRepository};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::entities::{
    Category, CodeRun, Comment, Contact, DeletedSubscriber, HistoryEntry, Reaction, Share,
    Snippet, Subscriber,
};
use crate::error::AppError;
use serde_json::json;

/// Rows of one table plus its id sequence.
#[derive(Debug)]
pub(crate) struct Table<T> {
    pub rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryTables {
    pub categories: Table<Category>,
    pub snippets: Table<Snippet>,
    pub history: Table<HistoryEntry>,
    pub reactions: Table<Reaction>,
    pub comments: Table<Comment>,
    pub shares: Table<Share>,
    pub runs: Table<CodeRun>,
    pub contacts: Table<Contact>,
    pub subscribers: Table<Subscriber>,
    pub deleted_subscribers: Table<DeletedSubscriber>,
}

/// Shared handle to the in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tables. A poisoned lock is recovered; every mutation leaves
    /// the tables consistent before it can panic.
    pub(crate) fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One page of `items`, 1-based.
pub(crate) fn paginate<T>(items: impl IntoIterator<Item = T>, page: i64, page_size: i64) -> Vec<T> {
    let skip = usize::try_from((page - 1).max(0) * page_size).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size.max(0)).unwrap_or(0);
    items.into_iter().skip(skip).take(take).collect()
}

pub(crate) fn unique_violation(constraint: &str) -> AppError {
    AppError::conflict(
        "Unique constraint violation",
        json!({ "constraint": constraint }),
    )
}

pub(crate) fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let items: Vec<i32> = (1..=7).collect();
        assert_eq!(paginate(items.clone(), 1, 3), vec![1, 2, 3]);
        assert_eq!(paginate(items.clone(), 3, 3), vec![7]);
        assert!(paginate(items, 4, 3).is_empty());
    }

    #[test]
    fn test_allocate_id_is_sequential() {
        let mut table = Table::<()>::default();
        assert_eq!(table.allocate_id(), 1);
        assert_eq!(table.allocate_id(), 2);
    }
}
