//! Handlers for snippet comments.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::activity::{CreateCommentRequest, UpdateCommentRequest};
use crate::api::extractors::CurrentUser;
use crate::domain::entities::{Comment, CommentPatch, CommentThread};
use crate::error::AppError;
use crate::state::AppState;

/// Lists top-level comments, newest first, each with its replies.
///
/// # Endpoint
///
/// `GET /api/snippets/{slug}/comments`
pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<CommentThread>>, AppError> {
    let snippet = state.snippet_service.get(&slug).await?;
    let threads = state.activity_service.list_comments(snippet.id).await?;
    Ok(Json(threads))
}

/// Adds a comment, or a reply when `parent` is set.
///
/// # Endpoint
///
/// `POST /api/snippets/{slug}/comments`
///
/// # Errors
///
/// Returns 400 if the parent comment is unknown or belongs to another snippet.
/// Returns 401 without `X-User-Id`.
pub async fn create_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    payload.validate()?;

    let snippet = state.snippet_service.get(&slug).await?;
    let comment = state
        .activity_service
        .create_comment(user_id, snippet.id, &payload.text, payload.parent)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /api/comments/{id}`
pub async fn get_comment_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(state.activity_service.get_comment(id).await?))
}

/// Edits the text or resolved flag of a comment.
///
/// # Endpoint
///
/// `PATCH /api/comments/{id}`
///
/// # Errors
///
/// Returns 403 if the caller is not the author.
pub async fn update_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    payload.validate()?;

    let patch = CommentPatch {
        text: payload.text,
        is_resolved: payload.is_resolved,
    };
    let comment = state
        .activity_service
        .update_comment(user_id, id, patch)
        .await?;

    Ok(Json(comment))
}

/// Deletes a comment together with its replies.
///
/// # Endpoint
///
/// `DELETE /api/comments/{id}`
///
/// # Errors
///
/// Returns 403 if the caller is not the author.
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.activity_service.delete_comment(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
