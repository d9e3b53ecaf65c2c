//! DTOs for category endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::PaginationParams;
use crate::domain::entities::{Category, CategoryStats};

/// Request body for `POST /api/categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Request body for `PATCH /api/categories/{slug}`. Absent fields are unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub search: Option<String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Category with its snippet statistics.
#[derive(Debug, Serialize)]
pub struct CategoryDetailResponse {
    #[serde(flatten)]
    pub category: Category,
    pub stats: CategoryStats,
}
