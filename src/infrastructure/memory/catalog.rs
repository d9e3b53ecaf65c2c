//! In-memory categories and snippets.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{MemoryStore, MemoryTables, paginate, to_i64, unique_violation};
use crate::domain::entities::{
    Category, CategoryPatch, CategoryStats, EngagementSummary, NewCategory, NewSnippet, Snippet,
    SnippetFilter, SnippetOrderField, SnippetPatch,
};
use crate::domain::repositories::{CategoryRepository, SlugLookup, SnippetRepository};
use crate::error::AppError;
use serde_json::json;

pub struct MemoryCategoryRepository {
    store: MemoryStore,
}

impl MemoryCategoryRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn category_matches(category: &Category, search: Option<&str>) -> bool {
    let Some(search) = search else {
        return true;
    };
    let needle = search.to_lowercase();
    [&category.name, &category.slug, &category.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn check_category_unique(
    tables: &MemoryTables,
    name: &str,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let others = || {
        tables
            .categories
            .rows
            .iter()
            .filter(move |c| Some(c.id) != exclude)
    };
    if others().any(|c| c.slug == slug) {
        return Err(unique_violation("categories_slug_key"));
    }
    if others().any(|c| c.name.to_lowercase() == name.to_lowercase()) {
        return Err(unique_violation("categories_name_lower_key"));
    }
    Ok(())
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError> {
        let mut tables = self.store.lock();
        check_category_unique(&tables, &new_category.name, &new_category.slug, None)?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: new_category.name,
            slug: new_category.slug,
            description: new_category.description,
            created_at: now,
            updated_at: now,
        };
        tables.categories.rows.push(category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let tables = self.store.lock();
        Ok(tables.categories.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, AppError> {
        let tables = self.store.lock();
        Ok(tables.categories.rows.iter().find(|c| c.slug == slug).cloned())
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let tables = self.store.lock();
        let name = name.to_lowercase();
        Ok(tables
            .categories
            .rows
            .iter()
            .any(|c| Some(c.id) != exclude_id && c.name.to_lowercase() == name))
    }

    async fn list(
        &self,
        search: Option<String>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Category>, AppError> {
        let tables = self.store.lock();
        let mut rows: Vec<Category> = tables
            .categories
            .rows
            .iter()
            .filter(|c| category_matches(c, search.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(rows, page, page_size))
    }

    async fn count(&self, search: Option<String>) -> Result<i64, AppError> {
        let tables = self.store.lock();
        Ok(to_i64(
            tables
                .categories
                .rows
                .iter()
                .filter(|c| category_matches(c, search.as_deref()))
                .count(),
        ))
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, AppError> {
        let mut tables = self.store.lock();
        let current = tables
            .categories
            .rows
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;

        let name = patch.name.unwrap_or(current.name);
        let slug = patch.slug.unwrap_or(current.slug);
        check_category_unique(&tables, &name, &slug, Some(id))?;

        let category = tables
            .categories
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;
        category.name = name;
        category.slug = slug;
        if let Some(description) = patch.description {
            category.description = description;
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.categories.rows.len();
        tables.categories.rows.retain(|c| c.id != id);
        if tables.categories.rows.len() == before {
            return Ok(false);
        }

        for snippet in tables
            .snippets
            .rows
            .iter_mut()
            .filter(|s| s.category_id == Some(id))
        {
            snippet.category_id = None;
        }
        Ok(true)
    }

    async fn stats(&self, id: Uuid) -> Result<CategoryStats, AppError> {
        let tables = self.store.lock();
        let mut stats = CategoryStats::default();
        let mut languages = BTreeMap::new();

        for snippet in tables
            .snippets
            .rows
            .iter()
            .filter(|s| s.category_id == Some(id))
        {
            stats.snippet_count += 1;
            if snippet.is_featured {
                stats.featured_snippet_count += 1;
            }
            *languages
                .entry(snippet.language.as_str().to_string())
                .or_insert(0) += 1;
        }

        stats.languages = languages;
        Ok(stats)
    }
}

#[async_trait]
impl SlugLookup for MemoryCategoryRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .categories
            .rows
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != exclude_id))
    }
}

pub struct MemorySnippetRepository {
    store: MemoryStore,
}

impl MemorySnippetRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn snippet_matches(snippet: &Snippet, filter: &SnippetFilter) -> bool {
    if filter.language.is_some_and(|l| l != snippet.language) {
        return false;
    }
    if filter.output_type.is_some_and(|o| o != snippet.output_type) {
        return false;
    }
    if filter.difficulty.is_some_and(|d| d != snippet.difficulty) {
        return false;
    }
    if filter.category_id.is_some() && filter.category_id != snippet.category_id {
        return false;
    }
    if filter.is_featured.is_some_and(|f| f != snippet.is_featured) {
        return false;
    }
    if let Some(tag) = &filter.tag {
        let tag = tag.trim().to_lowercase();
        if !snippet.tag_list().iter().any(|t| t.to_lowercase() == tag) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let hit = [
            &snippet.title,
            &snippet.description,
            &snippet.code_content,
            &snippet.tags,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    true
}

fn compare(a: &Snippet, b: &Snippet, field: SnippetOrderField) -> Ordering {
    match field {
        SnippetOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        SnippetOrderField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SnippetOrderField::Title => a.title.cmp(&b.title),
        SnippetOrderField::Difficulty => a.difficulty.cmp(&b.difficulty),
        SnippetOrderField::Language => a.language.as_str().cmp(b.language.as_str()),
    }
}

fn check_snippet_slug(
    tables: &MemoryTables,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    if tables
        .snippets
        .rows
        .iter()
        .any(|s| s.slug == slug && Some(s.id) != exclude)
    {
        return Err(unique_violation("snippets_slug_key"));
    }
    Ok(())
}

fn check_category_exists(tables: &MemoryTables, category_id: Option<Uuid>) -> Result<(), AppError> {
    match category_id {
        Some(id) if !tables.categories.rows.iter().any(|c| c.id == id) => Err(
            AppError::bad_request(
                "Referenced entity does not exist",
                json!({ "constraint": "snippets_category_id_fkey" }),
            ),
        ),
        _ => Ok(()),
    }
}

#[async_trait]
impl SnippetRepository for MemorySnippetRepository {
    async fn create(&self, new: NewSnippet) -> Result<Snippet, AppError> {
        let mut tables = self.store.lock();
        check_snippet_slug(&tables, &new.slug, None)?;
        check_category_exists(&tables, new.category_id)?;

        let now = Utc::now();
        let snippet = Snippet {
            id: Uuid::new_v4(),
            title: new.title,
            slug: new.slug,
            description: new.description,
            short_description: new.short_description,
            tags: new.tags,
            language: new.language,
            output_type: new.output_type,
            code_content: new.code_content,
            html_code: new.html_code,
            css_code: new.css_code,
            js_code: new.js_code,
            additional_files: new.additional_files,
            simulated_output: new.simulated_output,
            expected_result: new.expected_result,
            thumbnail_image: new.thumbnail_image,
            is_featured: new.is_featured,
            difficulty: new.difficulty,
            category_id: new.category_id,
            uploaded_by: new.uploaded_by,
            created_at: now,
            updated_at: now,
            last_accessed: None,
        };
        tables.snippets.rows.push(snippet.clone());
        Ok(snippet)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Snippet>, AppError> {
        let tables = self.store.lock();
        Ok(tables.snippets.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Snippet>, AppError> {
        let tables = self.store.lock();
        Ok(tables.snippets.rows.iter().find(|s| s.slug == slug).cloned())
    }

    async fn list(
        &self,
        filter: SnippetFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Snippet>, AppError> {
        let tables = self.store.lock();
        let ordering = filter.ordering;

        // Newest rows first so ties keep the same order as the SQL `id DESC`.
        let mut rows: Vec<Snippet> = tables
            .snippets
            .rows
            .iter()
            .rev()
            .filter(|s| snippet_matches(s, &filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ord = compare(a, b, ordering.field);
            if ordering.descending { ord.reverse() } else { ord }
        });

        Ok(paginate(rows, page, page_size))
    }

    async fn count(&self, filter: SnippetFilter) -> Result<i64, AppError> {
        let tables = self.store.lock();
        Ok(to_i64(
            tables
                .snippets
                .rows
                .iter()
                .filter(|s| snippet_matches(s, &filter))
                .count(),
        ))
    }

    async fn update(&self, id: Uuid, patch: SnippetPatch) -> Result<Snippet, AppError> {
        let mut tables = self.store.lock();
        if let Some(slug) = &patch.slug {
            check_snippet_slug(&tables, slug, Some(id))?;
        }
        if let Some(category_id) = patch.category_id {
            check_category_exists(&tables, category_id)?;
        }

        let snippet = tables
            .snippets
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Snippet not found", json!({ "id": id })))?;

        if let Some(v) = patch.title {
            snippet.title = v;
        }
        if let Some(v) = patch.slug {
            snippet.slug = v;
        }
        if let Some(v) = patch.description {
            snippet.description = v;
        }
        if let Some(v) = patch.short_description {
            snippet.short_description = v;
        }
        if let Some(v) = patch.tags {
            snippet.tags = v;
        }
        if let Some(v) = patch.language {
            snippet.language = v;
        }
        if let Some(v) = patch.output_type {
            snippet.output_type = v;
        }
        if let Some(v) = patch.code_content {
            snippet.code_content = v;
        }
        if let Some(v) = patch.html_code {
            snippet.html_code = v;
        }
        if let Some(v) = patch.css_code {
            snippet.css_code = v;
        }
        if let Some(v) = patch.js_code {
            snippet.js_code = v;
        }
        if let Some(v) = patch.additional_files {
            snippet.additional_files = v;
        }
        if let Some(v) = patch.simulated_output {
            snippet.simulated_output = v;
        }
        if let Some(v) = patch.expected_result {
            snippet.expected_result = v;
        }
        if let Some(v) = patch.thumbnail_image {
            snippet.thumbnail_image = v;
        }
        if let Some(v) = patch.is_featured {
            snippet.is_featured = v;
        }
        if let Some(v) = patch.difficulty {
            snippet.difficulty = v;
        }
        if let Some(v) = patch.category_id {
            snippet.category_id = v;
        }
        snippet.updated_at = Utc::now();

        Ok(snippet.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.store.lock();
        let before = tables.snippets.rows.len();
        tables.snippets.rows.retain(|s| s.id != id);
        if tables.snippets.rows.len() == before {
            return Ok(false);
        }

        tables.history.rows.retain(|h| h.snippet_id != id);
        tables.reactions.rows.retain(|r| r.snippet_id != id);
        tables.comments.rows.retain(|c| c.snippet_id != id);
        tables.shares.rows.retain(|s| s.snippet_id != id);
        tables.runs.rows.retain(|r| r.snippet_id != id);
        Ok(true)
    }

    async fn touch_accessed(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut tables = self.store.lock();
        if let Some(snippet) = tables.snippets.rows.iter_mut().find(|s| s.id == id) {
            snippet.last_accessed = Some(at);
        }
        Ok(())
    }

    async fn engagement_summary(&self, id: Uuid) -> Result<EngagementSummary, AppError> {
        let tables = self.store.lock();
        let reactions = tables.reactions.rows.iter().filter(|r| r.snippet_id == id);
        let (likes, dislikes): (Vec<_>, Vec<_>) = reactions.partition(|r| r.is_like);

        Ok(EngagementSummary {
            like_count: to_i64(likes.len()),
            dislike_count: to_i64(dislikes.len()),
            comment_count: to_i64(
                tables
                    .comments
                    .rows
                    .iter()
                    .filter(|c| c.snippet_id == id)
                    .count(),
            ),
            view_count: tables
                .history
                .rows
                .iter()
                .filter(|h| h.snippet_id == id)
                .map(|h| h.view_count)
                .sum(),
            run_count: to_i64(tables.runs.rows.iter().filter(|r| r.snippet_id == id).count()),
        })
    }
}

#[async_trait]
impl SlugLookup for MemorySnippetRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let tables = self.store.lock();
        Ok(tables
            .snippets
            .rows
            .iter()
            .any(|s| s.slug == slug && Some(s.id) != exclude_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Language, SnippetOrdering};

    fn new_snippet(title: &str, slug: &str, language: Language) -> NewSnippet {
        NewSnippet {
            title: title.to_string(),
            slug: slug.to_string(),
            language,
            code_content: "print(1)".to_string(),
            tags: "Basics, loops".to_string(),
            difficulty: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let repo = MemorySnippetRepository::new(MemoryStore::new());
        repo.create(new_snippet("A", "a", Language::Python))
            .await
            .unwrap();

        let result = repo.create(new_snippet("A", "a", Language::Python)).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = MemorySnippetRepository::new(MemoryStore::new());
        repo.create(new_snippet("Bravo", "bravo", Language::Python))
            .await
            .unwrap();
        repo.create(new_snippet("Alpha", "alpha", Language::Python))
            .await
            .unwrap();
        repo.create(new_snippet("Gamma", "gamma", Language::Go))
            .await
            .unwrap();

        let filter = SnippetFilter {
            language: Some(Language::Python),
            tag: Some("LOOPS".to_string()),
            ordering: "title".parse::<SnippetOrdering>().unwrap(),
            ..Default::default()
        };
        let rows = repo.list(filter.clone(), 1, 10).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(titles, vec!["Alpha", "Bravo"]);
        assert_eq!(repo.count(filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_category_delete_detaches_snippets() {
        let store = MemoryStore::new();
        let categories = MemoryCategoryRepository::new(store.clone());
        let snippets = MemorySnippetRepository::new(store);

        let category = categories
            .create(NewCategory {
                name: "Web".to_string(),
                slug: "web".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let mut new = new_snippet("A", "a", Language::Html);
        new.category_id = Some(category.id);
        let snippet = snippets.create(new).await.unwrap();

        assert!(categories.delete(category.id).await.unwrap());

        let snippet = snippets.find_by_id(snippet.id).await.unwrap().unwrap();
        assert_eq!(snippet.category_id, None);
    }

    #[tokio::test]
    async fn test_category_name_is_case_insensitive_unique() {
        let repo = MemoryCategoryRepository::new(MemoryStore::new());
        repo.create(NewCategory {
            name: "Web".to_string(),
            slug: "web".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

        assert!(repo.name_exists("WEB", None).await.unwrap());
        let result = repo
            .create(NewCategory {
                name: "wEB".to_string(),
                slug: "web-1".to_string(),
                description: String::new(),
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }
}
