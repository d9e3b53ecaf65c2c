//! PostgreSQL implementation of the category repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::like_pattern;
use crate::domain::entities::{Category, CategoryPatch, CategoryStats, NewCategory};
use crate::domain::repositories::{CategoryRepository, SlugLookup};
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// PostgreSQL repository for categories.
///
/// Also answers slug lookups for the category
/// [`SlugGenerator`](crate::application::services::SlugGenerator).
pub struct PgCategoryRepository {
    pool: Arc<PgPool>,
}

impl PgCategoryRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (id, name, slug, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_category.name)
        .bind(&new_category.slug)
        .bind(&new_category.description)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(category)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn list(
        &self,
        search: Option<String>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Category>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories
             WHERE ($1::text IS NULL
                    OR name ILIKE $1 OR slug ILIKE $1 OR description ILIKE $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        ))
        .bind(search.as_deref().map(like_pattern))
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn count(&self, search: Option<String>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories
             WHERE ($1::text IS NULL
                    OR name ILIKE $1 OR slug ILIKE $1 OR description ILIKE $1)",
        )
        .bind(search.as_deref().map(like_pattern))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = COALESCE($2, name),
                 slug = COALESCE($3, slug),
                 description = COALESCE($4, description),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.slug)
        .bind(patch.description)
        .fetch_optional(self.pool.as_ref())
        .await?;

        category.ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self, id: Uuid) -> Result<CategoryStats, AppError> {
        let (snippet_count, featured_snippet_count) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_featured)
             FROM snippets WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool.as_ref())
        .await?;

        let languages = sqlx::query_as::<_, (String, i64)>(
            "SELECT language, COUNT(*) FROM snippets
             WHERE category_id = $1
             GROUP BY language",
        )
        .bind(id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(CategoryStats {
            snippet_count,
            featured_snippet_count,
            languages: languages.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }
}

#[async_trait]
impl SlugLookup for PgCategoryRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }
}
