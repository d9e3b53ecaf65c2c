//! PostgreSQL implementation of the snippet repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use super::like_pattern;
use crate::domain::entities::{
    EngagementSummary, NewSnippet, Snippet, SnippetFilter, SnippetOrderField, SnippetPatch,
};
use crate::domain::repositories::{SlugLookup, SnippetRepository};
use crate::error::AppError;
use serde_json::json;

const COLUMNS: &str = "id, title, slug, description, short_description, tags, language, \
    output_type, code_content, html_code, css_code, js_code, additional_files, \
    simulated_output, expected_result, thumbnail_image, is_featured, difficulty, \
    category_id, uploaded_by, created_at, updated_at, last_accessed";

/// PostgreSQL repository for snippets.
///
/// Listing queries are assembled with [`QueryBuilder`] because every filter
/// is optional.
pub struct PgSnippetRepository {
    pool: Arc<PgPool>,
}

impl PgSnippetRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &SnippetFilter) {
    qb.push(" WHERE TRUE");

    if let Some(language) = filter.language {
        qb.push(" AND language = ").push_bind(language.as_str());
    }
    if let Some(output_type) = filter.output_type {
        qb.push(" AND output_type = ").push_bind(output_type.as_str());
    }
    if let Some(difficulty) = filter.difficulty {
        qb.push(" AND difficulty = ").push_bind(difficulty);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(is_featured) = filter.is_featured {
        qb.push(" AND is_featured = ").push_bind(is_featured);
    }
    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM unnest(string_to_array(tags, ',')) AS t(tag) \
             WHERE LOWER(TRIM(t.tag)) = LOWER(",
        )
        .push_bind(tag.trim().to_string())
        .push("))");
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR code_content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR tags ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn order_column(field: SnippetOrderField) -> &'static str {
    match field {
        SnippetOrderField::CreatedAt => "created_at",
        SnippetOrderField::UpdatedAt => "updated_at",
        SnippetOrderField::Title => "title",
        SnippetOrderField::Difficulty => "difficulty",
        SnippetOrderField::Language => "language",
    }
}

#[async_trait]
impl SnippetRepository for PgSnippetRepository {
    async fn create(&self, new: NewSnippet) -> Result<Snippet, AppError> {
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            "INSERT INTO snippets (
                id, title, slug, description, short_description, tags, language,
                output_type, code_content, html_code, css_code, js_code, additional_files,
                simulated_output, expected_result, thumbnail_image, is_featured, difficulty,
                category_id, uploaded_by
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(&new.short_description)
        .bind(&new.tags)
        .bind(new.language.as_str())
        .bind(new.output_type.as_str())
        .bind(&new.code_content)
        .bind(&new.html_code)
        .bind(&new.css_code)
        .bind(&new.js_code)
        .bind(&new.additional_files)
        .bind(&new.simulated_output)
        .bind(&new.expected_result)
        .bind(&new.thumbnail_image)
        .bind(new.is_featured)
        .bind(new.difficulty)
        .bind(new.category_id)
        .bind(new.uploaded_by)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(snippet)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Snippet>, AppError> {
        let snippet =
            sqlx::query_as::<_, Snippet>(&format!("SELECT {COLUMNS} FROM snippets WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(snippet)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Snippet>, AppError> {
        let snippet =
            sqlx::query_as::<_, Snippet>(&format!("SELECT {COLUMNS} FROM snippets WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(snippet)
    }

    async fn list(
        &self,
        filter: SnippetFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Snippet>, AppError> {
        let offset = (page - 1) * page_size;
        let direction = if filter.ordering.descending {
            "DESC"
        } else {
            "ASC"
        };

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM snippets"));
        push_filters(&mut qb, &filter);
        qb.push(format!(
            " ORDER BY {} {direction}, id {direction}",
            order_column(filter.ordering.field)
        ));
        qb.push(" LIMIT ").push_bind(page_size);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb
            .build_query_as::<Snippet>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows)
    }

    async fn count(&self, filter: SnippetFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM snippets");
        push_filters(&mut qb, &filter);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, AppError> {
        // Nullable columns take a (touch, value) pair so they can be cleared.
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            "UPDATE snippets SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                short_description = COALESCE($5, short_description),
                tags = COALESCE($6, tags),
                language = COALESCE($7, language),
                output_type = COALESCE($8, output_type),
                code_content = COALESCE($9, code_content),
                html_code = CASE WHEN $10 THEN $11 ELSE html_code END,
                css_code = CASE WHEN $12 THEN $13 ELSE css_code END,
                js_code = CASE WHEN $14 THEN $15 ELSE js_code END,
                additional_files = CASE WHEN $16 THEN $17 ELSE additional_files END,
                simulated_output = CASE WHEN $18 THEN $19 ELSE simulated_output END,
                expected_result = CASE WHEN $20 THEN $21 ELSE expected_result END,
                thumbnail_image = CASE WHEN $22 THEN $23 ELSE thumbnail_image END,
                is_featured = COALESCE($24, is_featured),
                difficulty = COALESCE($25, difficulty),
                category_id = CASE WHEN $26 THEN $27 ELSE category_id END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.slug)
        .bind(patch.description)
        .bind(patch.short_description)
        .bind(patch.tags)
        .bind(patch.language.map(|l| l.as_str()))
        .bind(patch.output_type.map(|o| o.as_str()))
        .bind(patch.code_content)
        .bind(patch.html_code.is_some())
        .bind(patch.html_code.flatten())
        .bind(patch.css_code.is_some())
        .bind(patch.css_code.flatten())
        .bind(patch.js_code.is_some())
        .bind(patch.js_code.flatten())
        .bind(patch.additional_files.is_some())
        .bind(patch.additional_files.flatten())
        .bind(patch.simulated_output.is_some())
        .bind(patch.simulated_output.flatten())
        .bind(patch.expected_result.is_some())
        .bind(patch.expected_result.flatten())
        .bind(patch.thumbnail_image.is_some())
        .bind(patch.thumbnail_image.flatten())
        .bind(patch.is_featured)
        .bind(patch.difficulty)
        .bind(patch.category_id.is_some())
        .bind(patch.category_id.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        snippet.ok_or_else(|| AppError::not_found("Snippet not found", json!({ "id": id })))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM snippets WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_accessed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE snippets SET last_accessed = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn engagement_summary(&self, id: Uuid) -> Result<EngagementSummary, AppError> {
        let (like_count, dislike_count, comment_count, view_count, run_count) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                "SELECT
                    (SELECT COUNT(*) FROM reactions WHERE snippet_id = $1 AND is_like),
                    (SELECT COUNT(*) FROM reactions WHERE snippet_id = $1 AND NOT is_like),
                    (SELECT COUNT(*) FROM comments WHERE snippet_id = $1),
                    (SELECT COALESCE(SUM(view_count), 0)::BIGINT
                        FROM history_entries WHERE snippet_id = $1),
                    (SELECT COUNT(*) FROM code_runs WHERE snippet_id = $1)",
            )
            .bind(id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(EngagementSummary {
            like_count,
            dislike_count,
            comment_count,
            view_count,
            run_count,
        })
    }
}

#[async_trait]
impl SlugLookup for PgSnippetRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM snippets WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }
}
