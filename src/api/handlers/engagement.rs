//! Handlers for views, reactions and the caller's history.
//!
//! Every endpoint here requires the `X-User-Id` header.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::engagement::{
    CreateHistoryRequest, ReactionRequest, ReactionStateResponse, UpdateHistoryRequest,
};
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::api::extractors::CurrentUser;
use crate::domain::entities::{HistoryEntry, Reaction};
use crate::error::AppError;
use crate::state::AppState;

/// Records one view of a snippet by the caller.
///
/// # Endpoint
///
/// `POST /api/snippets/{slug}/views`
///
/// The first view creates the history entry with `view_count = 1`; later
/// views increment it. Always answers 200 with the current entry.
pub async fn record_view_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<HistoryEntry>, AppError> {
    let snippet = state.snippet_service.get(&slug).await?;
    let entry = state
        .engagement_service
        .record_view(user_id, snippet.id)
        .await?;
    Ok(Json(entry))
}

/// Returns the caller's reaction to a snippet.
///
/// # Endpoint
///
/// `GET /api/snippets/{slug}/reactions`
pub async fn get_reaction_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<ReactionStateResponse>, AppError> {
    let snippet = state.snippet_service.get(&slug).await?;
    let reaction = state
        .engagement_service
        .get_reaction(user_id, snippet.id)
        .await?;
    Ok(Json(ReactionStateResponse { reaction }))
}

/// Likes or dislikes a snippet, replacing any earlier reaction.
///
/// # Endpoint
///
/// `POST /api/snippets/{slug}/reactions`
///
/// # Response Codes
///
/// - **201 Created**: First reaction by this caller
/// - **200 OK**: Existing reaction updated or left as is
pub async fn set_reaction_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
    Json(payload): Json<ReactionRequest>,
) -> Result<(StatusCode, Json<Reaction>), AppError> {
    let snippet = state.snippet_service.get(&slug).await?;
    let (reaction, created) = state
        .engagement_service
        .set_reaction(user_id, snippet.id, payload.is_like)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(reaction)))
}

/// Removes the caller's reaction.
///
/// # Endpoint
///
/// `DELETE /api/snippets/{slug}/reactions`
///
/// # Errors
///
/// Returns 404 if the caller has not reacted to this snippet.
pub async fn delete_reaction_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let snippet = state.snippet_service.get(&slug).await?;

    if !state
        .engagement_service
        .remove_reaction(user_id, snippet.id)
        .await?
    {
        return Err(AppError::not_found(
            "Reaction not found",
            json!({ "snippet": slug }),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the caller's history, most recently viewed first.
///
/// # Endpoint
///
/// `GET /api/history?page=1&page_size=20`
pub async fn list_history_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<HistoryEntry>>, AppError> {
    let (page, page_size) = params.resolve()?;

    let (items, total) = state
        .engagement_service
        .list_history(user_id, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// Records a view, or sets the saved flag when `is_saved` is given.
///
/// # Endpoint
///
/// `POST /api/history`
///
/// # Request Body
///
/// ```json
/// { "snippet": "quick-sort", "is_saved": true }
/// ```
pub async fn create_history_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateHistoryRequest>,
) -> Result<Json<HistoryEntry>, AppError> {
    payload.validate()?;

    let snippet = state.snippet_service.get(&payload.snippet).await?;
    let entry = match payload.is_saved {
        Some(saved) => {
            state
                .engagement_service
                .set_saved(user_id, snippet.id, saved)
                .await?
        }
        None => {
            state
                .engagement_service
                .record_view(user_id, snippet.id)
                .await?
        }
    };

    Ok(Json(entry))
}

/// # Endpoint
///
/// `GET /api/history/{id}`
///
/// # Errors
///
/// Returns 404 if the entry does not exist or belongs to another user.
pub async fn get_history_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<HistoryEntry>, AppError> {
    let entry = state
        .engagement_service
        .get_history_entry(user_id, id)
        .await?;
    Ok(Json(entry))
}

/// Sets or clears the saved flag of one entry.
///
/// # Endpoint
///
/// `PATCH /api/history/{id}`
pub async fn update_history_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateHistoryRequest>,
) -> Result<Json<HistoryEntry>, AppError> {
    let entry = state
        .engagement_service
        .update_history_entry(user_id, id, payload.is_saved)
        .await?;
    Ok(Json(entry))
}

/// # Endpoint
///
/// `DELETE /api/history/{id}`
pub async fn delete_history_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .engagement_service
        .delete_history_entry(user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
