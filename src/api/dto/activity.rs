//! DTOs for comments, shares and code runs.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::ShareMethod;

/// Request body for `POST /api/snippets/{slug}/comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1 to 5000 characters"))]
    pub text: String,

    /// Id of the comment being replied to.
    pub parent: Option<i64>,
}

/// Request body for `PATCH /api/comments/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1 to 5000 characters"))]
    pub text: Option<String>,

    pub is_resolved: Option<bool>,
}

/// Request body for `POST /api/snippets/{slug}/shares`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateShareRequest {
    #[serde(default)]
    pub share_method: ShareMethod,

    #[validate(length(max = 254))]
    pub shared_to: Option<String>,
}

/// Request body for `POST /api/snippets/{slug}/runs`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRunRequest {
    #[serde(default)]
    pub was_modified: bool,

    pub execution_time_ms: Option<f64>,
}
