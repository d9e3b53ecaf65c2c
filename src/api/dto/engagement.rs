//! DTOs for views, reactions and history.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Reaction;

/// Request body for `POST /api/snippets/{slug}/reactions`.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub is_like: bool,
}

/// The caller's reaction, or `null` when there is none.
#[derive(Debug, Serialize)]
pub struct ReactionStateResponse {
    pub reaction: Option<Reaction>,
}

/// Request body for `POST /api/history`.
///
/// Without `is_saved` this records a view; with it, the saved flag is set and
/// the view count is left alone.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHistoryRequest {
    #[validate(length(min = 1, message = "Snippet slug is required"))]
    pub snippet: String,

    pub is_saved: Option<bool>,
}

/// Request body for `PATCH /api/history/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateHistoryRequest {
    pub is_saved: bool,
}
