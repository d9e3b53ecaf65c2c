//! In-memory comments, shares and code runs.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{MemoryStore, MemoryTables, paginate, to_i64};
use crate::domain::entities::{
    CodeRun, Comment, CommentPatch, NewCodeRun, NewComment, NewShare, Share,
};
use crate::domain::repositories::{CommentRepository, RunRepository, ShareRepository};
use crate::error::AppError;
use serde_json::json;

fn check_snippet_exists(
    tables: &MemoryTables,
    snippet_id: Uuid,
    constraint: &str,
) -> Result<(), AppError> {
    if tables.snippets.rows.iter().any(|s| s.id == snippet_id) {
        return Ok(());
    }
    Err(AppError::bad_request(
        "Referenced entity does not exist",
        json!({ "constraint": constraint }),
    ))
}

pub struct MemoryCommentRepository {
    store: MemoryStore,
}

impl MemoryCommentRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.store.lock();
        check_snippet_exists(&tables, new_comment.snippet_id, "comments_snippet_id_fkey")?;

        let now = Utc::now();
        let comment = Comment {
            id: tables.comments.allocate_id(),
            user_id: new_comment.user_id,
            snippet_id: new_comment.snippet_id,
            parent_id: new_comment.parent_id,
            text: new_comment.text,
            is_resolved: false,
            created_at: now,
            updated_at: now,
        };
        tables.comments.rows.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let tables = self.store.lock();
        Ok(tables.comments.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .comments
            .rows
            .iter()
            .filter(|c| c.snippet_id == snippet_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, patch: CommentPatch) -> Result<Comment, AppError> {
        let mut tables = self.store.lock();
        let comment = tables
            .comments
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Comment not found", json!({ "id": id })))?;

        if let Some(text) = patch.text {
            comment.text = text;
        }
        if let Some(is_resolved) = patch.is_resolved {
            comment.is_resolved = is_resolved;
        }
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        if !tables.comments.rows.iter().any(|c| c.id == id) {
            return Ok(false);
        }

        // Replies cascade, transitively.
        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            doomed.extend(
                tables
                    .comments
                    .rows
                    .iter()
                    .filter(|c| c.parent_id == Some(parent))
                    .map(|c| c.id),
            );
            i += 1;
        }
        tables.comments.rows.retain(|c| !doomed.contains(&c.id));
        Ok(true)
    }
}

pub struct MemoryShareRepository {
    store: MemoryStore,
}

impl MemoryShareRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ShareRepository for MemoryShareRepository {
    async fn create(&self, new_share: NewShare) -> Result<Share, AppError> {
        let mut tables = self.store.lock();
        check_snippet_exists(&tables, new_share.snippet_id, "shares_snippet_id_fkey")?;

        let share = Share {
            id: tables.shares.allocate_id(),
            user_id: new_share.user_id,
            snippet_id: new_share.snippet_id,
            share_method: new_share.share_method,
            shared_to: new_share.shared_to,
            shared_at: Utc::now(),
            ip_address: new_share.ip_address,
        };
        tables.shares.rows.push(share.clone());
        Ok(share)
    }

    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Share>, AppError> {
        let tables = self.store.lock();
        let rows = tables
            .shares
            .rows
            .iter()
            .rev()
            .filter(|s| s.snippet_id == snippet_id)
            .cloned();
        Ok(paginate(rows, page, page_size))
    }

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError> {
        let tables = self.store.lock();
        Ok(to_i64(
            tables
                .shares
                .rows
                .iter()
                .filter(|s| s.snippet_id == snippet_id)
                .count(),
        ))
    }
}

pub struct MemoryRunRepository {
    store: MemoryStore,
}

impl MemoryRunRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RunRepository for MemoryRunRepository {
    async fn create(&self, new_run: NewCodeRun) -> Result<CodeRun, AppError> {
        let mut tables = self.store.lock();
        check_snippet_exists(&tables, new_run.snippet_id, "code_runs_snippet_id_fkey")?;

        let run = CodeRun {
            id: tables.runs.allocate_id(),
            user_id: new_run.user_id,
            snippet_id: new_run.snippet_id,
            run_at: Utc::now(),
            was_modified: new_run.was_modified,
            execution_time_ms: new_run.execution_time_ms,
            user_agent: new_run.user_agent,
            ip_address: new_run.ip_address,
        };
        tables.runs.rows.push(run.clone());
        Ok(run)
    }

    async fn list_for_snippet(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<CodeRun>, AppError> {
        let tables = self.store.lock();
        let rows = tables
            .runs
            .rows
            .iter()
            .rev()
            .filter(|r| r.snippet_id == snippet_id)
            .cloned();
        Ok(paginate(rows, page, page_size))
    }

    async fn count_for_snippet(&self, snippet_id: Uuid) -> Result<i64, AppError> {
        let tables = self.store.lock();
        Ok(to_i64(
            tables
                .runs
                .rows
                .iter()
                .filter(|r| r.snippet_id == snippet_id)
                .count(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewSnippet;
    use crate::domain::repositories::SnippetRepository;
    use crate::infrastructure::memory::MemorySnippetRepository;

    #[tokio::test]
    async fn test_comment_delete_cascades_to_replies() {
        let store = MemoryStore::new();
        let snippet = MemorySnippetRepository::new(store.clone())
            .create(NewSnippet {
                title: "A".to_string(),
                slug: "a".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let repo = MemoryCommentRepository::new(store);

        let root = repo
            .create(NewComment {
                user_id: 1,
                snippet_id: snippet.id,
                parent_id: None,
                text: "root".to_string(),
            })
            .await
            .unwrap();
        let reply = repo
            .create(NewComment {
                user_id: 2,
                snippet_id: snippet.id,
                parent_id: Some(root.id),
                text: "reply".to_string(),
            })
            .await
            .unwrap();
        repo.create(NewComment {
            user_id: 1,
            snippet_id: snippet.id,
            parent_id: Some(reply.id),
            text: "nested".to_string(),
        })
        .await
        .unwrap();

        assert!(repo.delete(root.id).await.unwrap());
        assert!(repo.list_for_snippet(snippet.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_share_requires_snippet() {
        let repo = MemoryShareRepository::new(MemoryStore::new());
        let result = repo
            .create(NewShare {
                user_id: None,
                snippet_id: Uuid::new_v4(),
                share_method: Default::default(),
                shared_to: None,
                ip_address: None,
            })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }
}
