//! Handlers for contact form submissions.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::contact::{CreateContactRequest, UpdateContactRequest};
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::domain::entities::{Contact, ContactPatch};
use crate::error::AppError;
use crate::state::AppState;

/// Stores a contact form submission and queues a notification.
///
/// # Endpoint
///
/// `POST /api/contacts`
///
/// # Errors
///
/// Returns 400 if a field is missing, too long, or the email or phone is
/// malformed.
pub async fn create_contact_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    payload.validate()?;

    let contact = state.contact_service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Lists submissions, newest first.
///
/// # Endpoint
///
/// `GET /api/contacts`
pub async fn list_contacts_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<Contact>>, AppError> {
    let (page, page_size) = params.resolve()?;

    let (items, total) = state
        .contact_service
        .list(i64::from(page), i64::from(page_size))
        .await?;

    Ok(Json(Page::new(items, page, page_size, total)))
}

/// `GET /api/contacts/{id}`
pub async fn get_contact_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(state.contact_service.get(id).await?))
}

/// Marks a submission read or archived.
///
/// # Endpoint
///
/// `PATCH /api/contacts/{id}`
pub async fn update_contact_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<Contact>, AppError> {
    let patch = ContactPatch {
        is_read: payload.is_read,
        is_archived: payload.is_archived,
    };
    Ok(Json(state.contact_service.update(id, patch).await?))
}

/// `DELETE /api/contacts/{id}`
pub async fn delete_contact_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.contact_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
