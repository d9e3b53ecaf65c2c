//! Handlers for newsletter subscription management.
//!
//! Unsubscribing moves an address to the deleted list; reactivating or
//! subscribing again moves it back.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::contact::{
    ClearDeletedResponse, EmailRequest, MessageResponse, UpdateSubscriberRequest,
};
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::domain::entities::{DeletedSubscriber, Subscriber};
use crate::error::AppError;
use crate::state::AppState;

/// Subscribes an address.
///
/// # Endpoint
///
/// `POST /api/newsletter/subscribe`
///
/// # Errors
///
/// Returns 400 for a malformed address.
/// Returns 409 if the address is already subscribed.
pub async fn subscribe_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<(StatusCode, Json<Subscriber>), AppError> {
    payload.validate()?;

    let subscriber = state.newsletter_service.subscribe(&payload.email).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// Unsubscribes the address in the request body.
///
/// # Endpoint
///
/// `POST /api/newsletter/unsubscribe`
///
/// # Errors
///
/// Returns 400 if the address was already unsubscribed.
/// Returns 404 if the address was never subscribed.
pub async fn unsubscribe_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    unsubscribe(&state, payload).await
}

/// Unsubscribe link target, e.g. from an email footer.
///
/// # Endpoint
///
/// `GET /api/newsletter/unsubscribe?email=ann@example.com`
pub async fn unsubscribe_link_handler(
    State(state): State<AppState>,
    Query(query): Query<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    unsubscribe(&state, query).await
}

async fn unsubscribe(
    state: &AppState,
    request: EmailRequest,
) -> Result<Json<MessageResponse>, AppError> {
    request.validate()?;

    let deleted = state.newsletter_service.unsubscribe(&request.email).await?;
    Ok(Json(MessageResponse {
        message: "Successfully unsubscribed from the newsletter".to_string(),
        email: Some(deleted.email),
    }))
}

/// `GET /api/newsletter/subscribers`
pub async fn list_subscribers_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<Subscriber>>, AppError> {
    let (page, page_size) = params.resolve()?;

    let (items, total) = state
        .newsletter_service
        .list(i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// `GET /api/newsletter/subscribers/{id}`
pub async fn get_subscriber_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Subscriber>, AppError> {
    Ok(Json(state.newsletter_service.get(id).await?))
}

/// Changes a subscriber's address.
///
/// # Endpoint
///
/// `PATCH /api/newsletter/subscribers/{id}`
///
/// # Errors
///
/// Returns 400 when `is_active` is `false`; use unsubscribe instead.
/// Returns 409 if the new address is already subscribed.
pub async fn update_subscriber_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubscriberRequest>,
) -> Result<Json<Subscriber>, AppError> {
    payload.validate()?;

    let subscriber = state
        .newsletter_service
        .update(id, payload.email.as_deref(), payload.is_active)
        .await?;

    Ok(Json(subscriber))
}

/// Removes a subscriber without keeping it on the deleted list.
///
/// # Endpoint
///
/// `DELETE /api/newsletter/subscribers/{id}`
pub async fn delete_subscriber_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.newsletter_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists unsubscribed addresses, most recent first.
///
/// # Endpoint
///
/// `GET /api/newsletter/deleted`
pub async fn list_deleted_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<DeletedSubscriber>>, AppError> {
    let (page, page_size) = params.resolve()?;

    let (items, total) = state
        .newsletter_service
        .list_deleted(i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// Purges the whole deleted list.
///
/// # Endpoint
///
/// `DELETE /api/newsletter/deleted`
///
/// # Response
///
/// ```json
/// { "deleted": 12 }
/// ```
pub async fn clear_deleted_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearDeletedResponse>, AppError> {
    let deleted = state.newsletter_service.clear_deleted().await?;
    Ok(Json(ClearDeletedResponse { deleted }))
}

/// `GET /api/newsletter/deleted/{id}`
pub async fn get_deleted_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedSubscriber>, AppError> {
    Ok(Json(state.newsletter_service.get_deleted(id).await?))
}

/// `DELETE /api/newsletter/deleted/{id}`
pub async fn delete_deleted_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.newsletter_service.delete_deleted(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Moves an address from the deleted list back to the active subscribers.
///
/// # Endpoint
///
/// `POST /api/newsletter/deleted/reactivate`
pub async fn reactivate_handler(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<(StatusCode, Json<Subscriber>), AppError> {
    payload.validate()?;

    let subscriber = state.newsletter_service.reactivate(&payload.email).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}
