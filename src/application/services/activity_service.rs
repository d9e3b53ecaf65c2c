//! Comments, shares and code runs attached to snippets.
//!
//! Callers resolve the snippet first; every method here takes its id.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{
    CodeRun, Comment, CommentPatch, CommentThread, NewCodeRun, NewComment, NewShare, Share,
};
use crate::domain::repositories::{CommentRepository, RunRepository, ShareRepository};
use crate::error::AppError;
use serde_json::json;
use uuid::Uuid;

pub struct ActivityService<CM, SH, RN>
where
    CM: CommentRepository + ?Sized,
    SH: ShareRepository + ?Sized,
    RN: RunRepository + ?Sized,
{
    comment_repository: Arc<CM>,
    share_repository: Arc<SH>,
    run_repository: Arc<RN>,
}

impl<CM, SH, RN> ActivityService<CM, SH, RN>
where
    CM: CommentRepository + ?Sized,
    SH: ShareRepository + ?Sized,
    RN: RunRepository + ?Sized,
{
    pub fn new(
        comment_repository: Arc<CM>,
        share_repository: Arc<SH>,
        run_repository: Arc<RN>,
    ) -> Self {
        Self {
            comment_repository,
            share_repository,
            run_repository,
        }
    }

    /// Returns top-level comments, newest first, each with its replies.
    ///
    /// Replies at any depth are attached to their top-level ancestor and
    /// listed oldest first.
    pub async fn list_comments(&self, snippet_id: Uuid) -> Result<Vec<CommentThread>, AppError> {
        let comments = self.comment_repository.list_for_snippet(snippet_id).await?;
        Ok(build_threads(comments))
    }

    /// Adds a comment, or a reply when `parent_id` is set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the text is blank, the parent does
    /// not exist, or the parent belongs to another snippet.
    pub async fn create_comment(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment, AppError> {
        let text = validate_text(text)?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .comment_repository
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::bad_request(
                        "Parent comment does not exist",
                        json!({ "field": "parent", "parent_id": parent_id }),
                    )
                })?;

            if parent.snippet_id != snippet_id {
                return Err(AppError::bad_request(
                    "Reply's snippet must match the parent comment's snippet",
                    json!({ "field": "parent", "parent_id": parent_id }),
                ));
            }
        }

        self.comment_repository
            .create(NewComment {
                user_id,
                snippet_id,
                parent_id,
                text,
            })
            .await
    }

    pub async fn get_comment(&self, id: i64) -> Result<Comment, AppError> {
        self.comment_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found", json!({ "id": id })))
    }

    /// Edits a comment. Only its author may do so.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if `user_id` is not the author.
    pub async fn update_comment(
        &self,
        user_id: i64,
        id: i64,
        mut patch: CommentPatch,
    ) -> Result<Comment, AppError> {
        self.owned_comment(user_id, id).await?;

        if let Some(text) = &patch.text {
            patch.text = Some(validate_text(text)?);
        }

        self.comment_repository.update(id, patch).await
    }

    /// Deletes a comment and its replies. Only its author may do so.
    pub async fn delete_comment(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        self.owned_comment(user_id, id).await?;

        if !self.comment_repository.delete(id).await? {
            return Err(AppError::not_found("Comment not found", json!({ "id": id })));
        }
        Ok(())
    }

    pub async fn list_shares(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Share>, i64), AppError> {
        let items = self
            .share_repository
            .list_for_snippet(snippet_id, page, page_size)
            .await?;
        let total = self.share_repository.count_for_snippet(snippet_id).await?;
        Ok((items, total))
    }

    pub async fn create_share(&self, mut new_share: NewShare) -> Result<Share, AppError> {
        new_share.shared_to = new_share
            .shared_to
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let share = self.share_repository.create(new_share).await?;
        tracing::debug!(
            snippet_id = %share.snippet_id,
            method = share.share_method.as_str(),
            "Share logged"
        );
        Ok(share)
    }

    pub async fn list_runs(
        &self,
        snippet_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<CodeRun>, i64), AppError> {
        let items = self
            .run_repository
            .list_for_snippet(snippet_id, page, page_size)
            .await?;
        let total = self.run_repository.count_for_snippet(snippet_id).await?;
        Ok((items, total))
    }

    /// Logs a code run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `execution_time_ms` is negative or
    /// not finite.
    pub async fn create_run(&self, new_run: NewCodeRun) -> Result<CodeRun, AppError> {
        if let Some(ms) = new_run.execution_time_ms
            && (!ms.is_finite() || ms < 0.0)
        {
            return Err(AppError::bad_request(
                "Execution time must be a non-negative number",
                json!({ "field": "execution_time_ms" }),
            ));
        }

        self.run_repository.create(new_run).await
    }

    async fn owned_comment(&self, user_id: i64, id: i64) -> Result<Comment, AppError> {
        let comment = self.get_comment(id).await?;
        if comment.user_id != user_id {
            return Err(AppError::forbidden(
                "Only the author can modify this comment",
                json!({ "id": id }),
            ));
        }
        Ok(comment)
    }
}

fn validate_text(text: &str) -> Result<String, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::bad_request(
            "Comment text is required",
            json!({ "field": "text" }),
        ));
    }
    Ok(text.to_string())
}

/// Groups comments (oldest first) into threads keyed by their root.
fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let parents: HashMap<i64, Option<i64>> =
        comments.iter().map(|c| (c.id, c.parent_id)).collect();

    let root_of = |mut id: i64| {
        // Bounded by the number of comments in case of a malformed cycle.
        for _ in 0..parents.len() {
            match parents.get(&id) {
                Some(Some(parent)) => id = *parent,
                _ => break,
            }
        }
        id
    };

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut replies: Vec<Comment> = Vec::new();

    for comment in comments {
        if comment.parent_id.is_none() {
            index.insert(comment.id, threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push(comment);
        }
    }

    for reply in replies {
        if let Some(&i) = index.get(&root_of(reply.id)) {
            threads[i].replies.push(reply);
        }
    }

    threads.reverse();
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShareMethod;
    use crate::domain::repositories::{
        MockCommentRepository, MockRunRepository, MockShareRepository,
    };
    use chrono::{Duration, Utc};

    fn comment(id: i64, user_id: i64, snippet_id: Uuid, parent_id: Option<i64>) -> Comment {
        let at = Utc::now() + Duration::seconds(id);
        Comment {
            id,
            user_id,
            snippet_id,
            parent_id,
            text: format!("comment {id}"),
            is_resolved: false,
            created_at: at,
            updated_at: at,
        }
    }

    fn service(
        comments: MockCommentRepository,
    ) -> ActivityService<MockCommentRepository, MockShareRepository, MockRunRepository> {
        ActivityService::new(
            Arc::new(comments),
            Arc::new(MockShareRepository::new()),
            Arc::new(MockRunRepository::new()),
        )
    }

    #[test]
    fn test_build_threads_groups_replies_under_root() {
        let s = Uuid::new_v4();
        let threads = build_threads(vec![
            comment(1, 1, s, None),
            comment(2, 2, s, Some(1)),
            comment(3, 1, s, None),
            comment(4, 3, s, Some(2)),
        ]);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, 3);
        assert!(threads[0].replies.is_empty());
        assert_eq!(threads[1].comment.id, 1);
        let reply_ids: Vec<i64> = threads[1].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_create_reply_on_other_snippet_is_validation_error() {
        let snippet = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .returning(move |id| Ok(Some(comment(id, 1, other, None))));
        comments.expect_create().times(0);

        let result = service(comments)
            .create_comment(1, snippet, "reply", Some(5))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_reply_missing_parent_is_validation_error() {
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(|_| Ok(None));

        let result = service(comments)
            .create_comment(1, Uuid::new_v4(), "reply", Some(5))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_comment_trims_text() {
        let snippet = Uuid::new_v4();
        let mut comments = MockCommentRepository::new();
        comments
            .expect_create()
            .withf(|new| new.text == "hello" && new.parent_id.is_none())
            .times(1)
            .returning(|new| {
                Ok(Comment {
                    text: new.text,
                    ..comment(1, new.user_id, new.snippet_id, None)
                })
            });

        let result = service(comments)
            .create_comment(1, snippet, "  hello  ", None)
            .await
            .unwrap();

        assert_eq!(result.text, "hello");
    }

    #[tokio::test]
    async fn test_create_blank_comment_is_validation_error() {
        let result = service(MockCommentRepository::new())
            .create_comment(1, Uuid::new_v4(), "   ", None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_comment_by_other_user_is_forbidden() {
        let snippet = Uuid::new_v4();
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .returning(move |id| Ok(Some(comment(id, 1, snippet, None))));
        comments.expect_update().times(0);

        let result = service(comments)
            .update_comment(2, 1, CommentPatch::default())
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_delete_comment_by_author() {
        let snippet = Uuid::new_v4();
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .returning(move |id| Ok(Some(comment(id, 1, snippet, None))));
        comments.expect_delete().times(1).returning(|_| Ok(true));

        assert!(service(comments).delete_comment(1, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_run_negative_time_is_validation_error() {
        let mut runs = MockRunRepository::new();
        runs.expect_create().times(0);
        let service = ActivityService::new(
            Arc::new(MockCommentRepository::new()),
            Arc::new(MockShareRepository::new()),
            Arc::new(runs),
        );

        let result = service
            .create_run(NewCodeRun {
                user_id: None,
                snippet_id: Uuid::new_v4(),
                was_modified: false,
                execution_time_ms: Some(-1.0),
                user_agent: None,
                ip_address: None,
            })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_share_drops_blank_target() {
        let mut shares = MockShareRepository::new();
        shares
            .expect_create()
            .withf(|new| new.shared_to.is_none())
            .times(1)
            .returning(|new| {
                Ok(Share {
                    id: 1,
                    user_id: new.user_id,
                    snippet_id: new.snippet_id,
                    share_method: new.share_method,
                    shared_to: new.shared_to,
                    shared_at: Utc::now(),
                    ip_address: new.ip_address,
                })
            });
        let service = ActivityService::new(
            Arc::new(MockCommentRepository::new()),
            Arc::new(shares),
            Arc::new(MockRunRepository::new()),
        );

        let result = service
            .create_share(NewShare {
                user_id: Some(1),
                snippet_id: Uuid::new_v4(),
                share_method: ShareMethod::Email,
                shared_to: Some("  ".to_string()),
                ip_address: Some("10.0.0.1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.share_method, ShareMethod::Email);
    }
}
