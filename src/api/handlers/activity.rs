//! Handlers for the share and code-run logs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::activity::{CreateRunRequest, CreateShareRequest};
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::api::extractors::{ClientMeta, MaybeUser};
use crate::domain::entities::{CodeRun, NewCodeRun, NewShare, Share};
use crate::error::AppError;
use crate::state::AppState;

/// Lists shares of a snippet, newest first.
///
/// # Endpoint
///
/// `GET /api/snippets/{slug}/shares`
pub async fn list_shares_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<Share>>, AppError> {
    let (page, page_size) = params.resolve()?;
    let snippet = state.snippet_service.get(&slug).await?;

    let (items, total) = state
        .activity_service
        .list_shares(snippet.id, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// Logs a share. Anonymous callers are allowed; the client address is stored.
///
/// # Endpoint
///
/// `POST /api/snippets/{slug}/shares`
///
/// # Request Body
///
/// ```json
/// { "share_method": "email", "shared_to": "friend@example.com" }
/// ```
pub async fn create_share_handler(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    client: ClientMeta,
    Path(slug): Path<String>,
    Json(payload): Json<CreateShareRequest>,
) -> Result<(StatusCode, Json<Share>), AppError> {
    payload.validate()?;

    let snippet = state.snippet_service.get(&slug).await?;
    let share = state
        .activity_service
        .create_share(NewShare {
            user_id,
            snippet_id: snippet.id,
            share_method: payload.share_method,
            shared_to: payload.shared_to,
            ip_address: client.ip,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(share)))
}

/// Lists runs of a snippet, newest first.
///
/// # Endpoint
///
/// `GET /api/snippets/{slug}/runs`
pub async fn list_runs_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<CodeRun>>, AppError> {
    let (page, page_size) = params.resolve()?;
    let snippet = state.snippet_service.get(&slug).await?;

    let (items, total) = state
        .activity_service
        .list_runs(snippet.id, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// Logs a code run with the client's address and user agent.
///
/// # Endpoint
///
/// `POST /api/snippets/{slug}/runs`
///
/// # Errors
///
/// Returns 400 if `execution_time_ms` is negative.
pub async fn create_run_handler(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    client: ClientMeta,
    Path(slug): Path<String>,
    Json(payload): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<CodeRun>), AppError> {
    let snippet = state.snippet_service.get(&slug).await?;
    let run = state
        .activity_service
        .create_run(NewCodeRun {
            user_id,
            snippet_id: snippet.id,
            was_modified: payload.was_modified,
            execution_time_ms: payload.execution_time_ms,
            user_agent: client.user_agent,
            ip_address: client.ip,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(run)))
}
