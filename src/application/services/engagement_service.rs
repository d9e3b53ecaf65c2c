//! Per-user engagement tracking: views, saved state and reactions.
//!
//! Every write follows the same discipline: try the update path first, fall
//! back to an insert, and on a uniqueness conflict (another request inserted
//! the same `(user_id, snippet_id)` pair first) start over. Counter changes are
//! applied by the store in one statement, so concurrent views never lose an
//! increment.

use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::entities::{HistoryEntry, NewHistoryEntry, Reaction};
use crate::domain::repositories::{HistoryRepository, ReactionRepository, SnippetRepository};
use crate::error::AppError;
use serde_json::json;
use uuid::Uuid;

/// Retries after a uniqueness conflict before the conflict is surfaced.
pub const MAX_CONFLICT_RETRIES: usize = 3;

pub struct EngagementService<H, R, S>
where
    H: HistoryRepository + ?Sized,
    R: ReactionRepository + ?Sized,
    S: SnippetRepository + ?Sized,
{
    history_repository: Arc<H>,
    reaction_repository: Arc<R>,
    snippet_repository: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<H, R, S> EngagementService<H, R, S>
where
    H: HistoryRepository + ?Sized,
    R: ReactionRepository + ?Sized,
    S: SnippetRepository + ?Sized,
{
    pub fn new(
        history_repository: Arc<H>,
        reaction_repository: Arc<R>,
        snippet_repository: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            history_repository,
            reaction_repository,
            snippet_repository,
            clock,
        }
    }

    /// Records one view of a snippet by a user.
    ///
    /// The first view creates the record with `view_count = 1`; later views
    /// increment it and move `last_viewed` to now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the snippet does not exist.
    /// Returns [`AppError::Conflict`] if concurrent inserts kept winning after
    /// [`MAX_CONFLICT_RETRIES`] retries.
    pub async fn record_view(
        &self,
        user_id: i64,
        snippet_id: Uuid,
    ) -> Result<HistoryEntry, AppError> {
        self.ensure_snippet(snippet_id).await?;

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            let now = self.clock.now();

            if let Some(entry) = self
                .history_repository
                .increment_view(user_id, snippet_id, now)
                .await?
            {
                metrics::counter!("snippet_views_total").increment(1);
                return Ok(entry);
            }

            match self
                .history_repository
                .insert(NewHistoryEntry::first_view(user_id, snippet_id, now))
                .await
            {
                Ok(entry) => {
                    metrics::counter!("snippet_views_total").increment(1);
                    return Ok(entry);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(
                        user_id,
                        %snippet_id,
                        attempt,
                        "View insert conflicted, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(exhausted(last_conflict, user_id, snippet_id))
    }

    /// Sets the saved flag on the user's record, creating it if needed.
    ///
    /// Saving an already saved record keeps its original `saved_at`;
    /// unsaving clears it. The view counter is never touched; a record
    /// created here starts at `view_count = 1`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_view`].
    pub async fn set_saved(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        saved: bool,
    ) -> Result<HistoryEntry, AppError> {
        self.ensure_snippet(snippet_id).await?;

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            let now = self.clock.now();

            if let Some(entry) = self
                .history_repository
                .update_saved(user_id, snippet_id, saved, now)
                .await?
            {
                return Ok(entry);
            }

            let new_entry = NewHistoryEntry {
                is_saved: saved,
                saved_at: saved.then_some(now),
                ..NewHistoryEntry::first_view(user_id, snippet_id, now)
            };

            match self.history_repository.insert(new_entry).await {
                Ok(entry) => return Ok(entry),
                Err(e) if e.is_conflict() => {
                    tracing::debug!(
                        user_id,
                        %snippet_id,
                        attempt,
                        "Save insert conflicted, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(exhausted(last_conflict, user_id, snippet_id))
    }

    /// Sets the user's reaction on a snippet.
    ///
    /// Returns the reaction and whether it was newly created. Repeating the
    /// current value changes nothing; the opposite value overwrites it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_view`].
    pub async fn set_reaction(
        &self,
        user_id: i64,
        snippet_id: Uuid,
        is_like: bool,
    ) -> Result<(Reaction, bool), AppError> {
        self.ensure_snippet(snippet_id).await?;

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            match self.reaction_repository.find(user_id, snippet_id).await? {
                Some(existing) if existing.is_like == is_like => return Ok((existing, false)),
                Some(existing) => {
                    match self.reaction_repository.update(existing.id, is_like).await {
                        Ok(reaction) => {
                            count_reaction(is_like);
                            return Ok((reaction, false));
                        }
                        // Retracted between find and update.
                        Err(AppError::NotFound { .. }) => continue,
                        Err(e) => return Err(e),
                    }
                }
                None => {
                    let now = self.clock.now();
                    match self
                        .reaction_repository
                        .insert(user_id, snippet_id, is_like, now)
                        .await
                    {
                        Ok(reaction) => {
                            count_reaction(is_like);
                            return Ok((reaction, true));
                        }
                        Err(e) if e.is_conflict() => {
                            tracing::debug!(
                                user_id,
                                %snippet_id,
                                attempt,
                                "Reaction insert conflicted, retrying"
                            );
                            last_conflict = Some(e);
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Err(exhausted(last_conflict, user_id, snippet_id))
    }

    /// Retracts the user's reaction. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the snippet does not exist.
    pub async fn remove_reaction(&self, user_id: i64, snippet_id: Uuid) -> Result<bool, AppError> {
        self.ensure_snippet(snippet_id).await?;
        self.reaction_repository.delete(user_id, snippet_id).await
    }

    pub async fn get_reaction(
        &self,
        user_id: i64,
        snippet_id: Uuid,
    ) -> Result<Option<Reaction>, AppError> {
        self.ensure_snippet(snippet_id).await?;
        self.reaction_repository.find(user_id, snippet_id).await
    }

    /// Lists a user's history with the total count.
    pub async fn list_history(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<HistoryEntry>, i64), AppError> {
        let items = self
            .history_repository
            .list_for_user(user_id, page, page_size)
            .await?;
        let total = self.history_repository.count_for_user(user_id).await?;
        Ok((items, total))
    }

    /// Fetches one history entry owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the entry does not exist or belongs
    /// to another user.
    pub async fn get_history_entry(&self, user_id: i64, id: i64) -> Result<HistoryEntry, AppError> {
        self.history_repository
            .find_by_id(id)
            .await?
            .filter(|entry| entry.user_id == user_id)
            .ok_or_else(|| AppError::not_found("History entry not found", json!({ "id": id })))
    }

    /// Changes the saved flag of an owned history entry.
    pub async fn update_history_entry(
        &self,
        user_id: i64,
        id: i64,
        is_saved: bool,
    ) -> Result<HistoryEntry, AppError> {
        let entry = self.get_history_entry(user_id, id).await?;
        let now = self.clock.now();

        self.history_repository
            .update_saved(user_id, entry.snippet_id, is_saved, now)
            .await?
            .ok_or_else(|| AppError::not_found("History entry not found", json!({ "id": id })))
    }

    pub async fn delete_history_entry(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        self.get_history_entry(user_id, id).await?;

        if !self.history_repository.delete(id).await? {
            return Err(AppError::not_found(
                "History entry not found",
                json!({ "id": id }),
            ));
        }
        Ok(())
    }

    async fn ensure_snippet(&self, snippet_id: Uuid) -> Result<(), AppError> {
        match self.snippet_repository.find_by_id(snippet_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(
                "Snippet not found",
                json!({ "snippet_id": snippet_id }),
            )),
        }
    }
}

fn count_reaction(is_like: bool) {
    let kind = if is_like { "like" } else { "dislike" };
    metrics::counter!("snippet_reactions_total", "kind" => kind).increment(1);
}

fn exhausted(last_conflict: Option<AppError>, user_id: i64, snippet_id: Uuid) -> AppError {
    tracing::warn!(user_id, %snippet_id, "Giving up after repeated write conflicts");
    last_conflict.unwrap_or_else(|| {
        AppError::conflict(
            "Concurrent update conflict",
            json!({ "user_id": user_id, "snippet_id": snippet_id }),
        )
    })
}
