//! Handlers for snippet endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::Page;
use crate::api::dto::snippet::{
    CreateSnippetRequest, SnippetDetailResponse, SnippetListQuery, SnippetResponse,
    UpdateSnippetRequest,
};
use crate::api::extractors::MaybeUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists snippets with optional filters.
///
/// # Endpoint
///
/// `GET /api/snippets`
///
/// # Query Parameters
///
/// - `language`, `output_type`, `difficulty`, `is_featured` - exact match
/// - `category` - category slug; an unknown slug gives an empty page
/// - `tag` - one tag, case-insensitive
/// - `search` - substring of title, description, code or tags
/// - `ordering` - `created_at`, `updated_at`, `title`, `difficulty` or
///   `language`, prefixed with `-` for descending (default `-created_at`)
/// - `page`, `page_size`
pub async fn list_snippets_handler(
    State(state): State<AppState>,
    Query(query): Query<SnippetListQuery>,
) -> Result<Json<Page<SnippetResponse>>, AppError> {
    let (page, page_size) = query.pagination.resolve()?;

    let (items, total) = state
        .snippet_service
        .list(query.to_query()?, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(
        Page::new(items, page, page_size, total).map(SnippetResponse::from),
    ))
}

/// Creates a snippet. When the caller is identified it is recorded as the
/// uploader.
///
/// # Endpoint
///
/// `POST /api/snippets`
///
/// # Errors
///
/// Returns 400 if validation fails, including an unknown category slug or a
/// web snippet without any HTML, CSS or JS.
pub async fn create_snippet_handler(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(payload): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<SnippetResponse>), AppError> {
    payload.validate()?;

    let snippet = state
        .snippet_service
        .create(payload.into_input(user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(snippet.into())))
}

/// Returns a snippet with view, reaction and comment counts.
///
/// Reading the detail stamps the snippet's `last_accessed` time.
///
/// # Endpoint
///
/// `GET /api/snippets/{slug}`
pub async fn get_snippet_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SnippetDetailResponse>, AppError> {
    let (snippet, engagement) = state.snippet_service.get_detail(&slug).await?;

    Ok(Json(SnippetDetailResponse {
        snippet: snippet.into(),
        engagement,
    }))
}

/// Applies a partial update. `null` clears an optional field.
///
/// # Endpoint
///
/// `PATCH /api/snippets/{slug}`
pub async fn update_snippet_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateSnippetRequest>,
) -> Result<Json<SnippetResponse>, AppError> {
    payload.validate()?;

    let snippet = state.snippet_service.update(&slug, payload.into()).await?;
    Ok(Json(snippet.into()))
}

/// Deletes a snippet with its history, reactions, comments, shares and runs.
///
/// # Endpoint
///
/// `DELETE /api/snippets/{slug}`
pub async fn delete_snippet_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    state.snippet_service.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
