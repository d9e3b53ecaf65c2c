//! Handlers for category endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::category::{
    CategoryDetailResponse, CategoryListQuery, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::api::dto::pagination::Page;
use crate::api::dto::snippet::{SnippetListQuery, SnippetResponse};
use crate::domain::entities::Category;
use crate::error::AppError;
use crate::state::AppState;

/// Lists categories ordered by name.
///
/// # Endpoint
///
/// `GET /api/categories?search=web&page=1&page_size=20`
///
/// `search` matches name, slug and description, case-insensitively.
pub async fn list_categories_handler(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Page<Category>>, AppError> {
    let (page, page_size) = query.pagination.resolve()?;

    let (items, total) = state
        .category_service
        .list(query.search, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// Creates a category. The slug is derived from the name.
///
/// # Endpoint
///
/// `POST /api/categories`
///
/// # Errors
///
/// Returns 400 if the name is empty or too long.
/// Returns 409 if a category with the same name (ignoring case) exists.
pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    payload.validate()?;

    let category = state
        .category_service
        .create(&payload.name, &payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Returns a category with snippet counts by language.
///
/// # Endpoint
///
/// `GET /api/categories/{slug}`
pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetailResponse>, AppError> {
    let (category, stats) = state.category_service.get_with_stats(&slug).await?;
    Ok(Json(CategoryDetailResponse { category, stats }))
}

/// Updates name and/or description.
///
/// # Endpoint
///
/// `PATCH /api/categories/{slug}`
///
/// # Errors
///
/// Returns 404 if the category does not exist.
/// Returns 409 if the new name is taken.
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    payload.validate()?;

    let category = state
        .category_service
        .update(&slug, payload.name, payload.description)
        .await?;

    Ok(Json(category))
}

/// Deletes a category. Its snippets stay, uncategorized.
///
/// # Endpoint
///
/// `DELETE /api/categories/{slug}`
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    state.category_service.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the snippets of one category, accepting the usual snippet filters.
///
/// # Endpoint
///
/// `GET /api/categories/{slug}/snippets`
///
/// # Errors
///
/// Returns 404 if the category does not exist.
pub async fn category_snippets_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(mut query): Query<SnippetListQuery>,
) -> Result<Json<Page<SnippetResponse>>, AppError> {
    let category = state.category_service.get(&slug).await?;
    let (page, page_size) = query.pagination.resolve()?;

    query.category = Some(category.slug);
    let (items, total) = state
        .snippet_service
        .list(query.to_query()?, i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(
        Page::new(items, page, page_size, total).map(SnippetResponse::from),
    ))
}
