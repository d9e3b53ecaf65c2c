//! Category management service.

use std::sync::Arc;

use crate::application::services::engagement_service::MAX_CONFLICT_RETRIES;
use crate::application::services::slug_generator::SlugGenerator;
use crate::domain::entities::{Category, CategoryPatch, CategoryStats, NewCategory};
use crate::domain::repositories::CategoryRepository;
use crate::error::AppError;
use serde_json::json;

/// Maximum category name length in characters.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Service for creating, renaming and browsing categories.
pub struct CategoryService<C: CategoryRepository + ?Sized> {
    category_repository: Arc<C>,
    slugs: SlugGenerator,
}

impl<C: CategoryRepository + ?Sized> CategoryService<C> {
    pub fn new(category_repository: Arc<C>, slugs: SlugGenerator) -> Self {
        Self {
            category_repository,
            slugs,
        }
    }

    /// Creates a category with a freshly generated slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is empty or too long.
    /// Returns [`AppError::Conflict`] if another category has the same name
    /// (case-insensitive), or if slug races kept failing after
    /// [`MAX_CONFLICT_RETRIES`] retries.
    pub async fn create(&self, name: &str, description: &str) -> Result<Category, AppError> {
        let name = validate_name(name)?;

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            self.ensure_name_free(name, None).await?;
            let slug = self.slugs.generate(name, None).await?;

            let new_category = NewCategory {
                name: name.to_string(),
                slug,
                description: description.trim().to_string(),
            };

            match self.category_repository.create(new_category).await {
                Ok(category) => {
                    tracing::info!(slug = %category.slug, "Category created");
                    return Ok(category);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(attempt, "Category insert conflicted, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            AppError::conflict("Category already exists", json!({ "name": name }))
        }))
    }

    /// Lists categories ordered by name, with the total count.
    pub async fn list(
        &self,
        search: Option<String>,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Category>, i64), AppError> {
        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let items = self
            .category_repository
            .list(search.clone(), page, page_size)
            .await?;
        let total = self.category_repository.count(search).await?;
        Ok((items, total))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category has this slug.
    pub async fn get(&self, slug: &str) -> Result<Category, AppError> {
        self.category_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "slug": slug })))
    }

    /// Fetches a category together with its snippet counts.
    pub async fn get_with_stats(&self, slug: &str) -> Result<(Category, CategoryStats), AppError> {
        let category = self.get(slug).await?;
        let stats = self.category_repository.stats(category.id).await?;
        Ok((category, stats))
    }

    /// Updates name and/or description.
    ///
    /// The slug is regenerated only when the name actually changes; renaming
    /// to a name with the same normalized form keeps the current slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no category has this slug.
    /// Returns [`AppError::Validation`] if the new name is invalid.
    /// Returns [`AppError::Conflict`] if the new name is taken.
    pub async fn update(
        &self,
        slug: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Category, AppError> {
        let category = self.get(slug).await?;
        let description = description.map(|d| d.trim().to_string());

        let new_name = match &name {
            Some(name) => {
                let name = validate_name(name)?;
                (name != category.name).then(|| name.to_string())
            }
            None => None,
        };

        let Some(new_name) = new_name else {
            let patch = CategoryPatch {
                description,
                ..CategoryPatch::default()
            };
            return self.category_repository.update(category.id, patch).await;
        };

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            self.ensure_name_free(&new_name, Some(category.id)).await?;
            let slug = self.slugs.generate(&new_name, Some(category.id)).await?;

            let patch = CategoryPatch {
                name: Some(new_name.clone()),
                slug: Some(slug),
                description: description.clone(),
            };

            match self.category_repository.update(category.id, patch).await {
                Ok(updated) => return Ok(updated),
                Err(e) if e.is_conflict() => {
                    tracing::debug!(attempt, "Category rename conflicted, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            AppError::conflict("Category already exists", json!({ "name": new_name }))
        }))
    }

    /// Deletes a category. Its snippets become uncategorized.
    pub async fn delete(&self, slug: &str) -> Result<(), AppError> {
        let category = self.get(slug).await?;

        if !self.category_repository.delete(category.id).await? {
            return Err(AppError::not_found(
                "Category not found",
                json!({ "slug": slug }),
            ));
        }

        tracing::info!(slug, "Category deleted");
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        exclude_id: Option<uuid::Uuid>,
    ) -> Result<(), AppError> {
        if self.category_repository.name_exists(name, exclude_id).await? {
            return Err(AppError::conflict(
                "A category with this name already exists",
                json!({ "name": name }),
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request(
            "Category name is required",
            json!({ "field": "name" }),
        ));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(AppError::bad_request(
            "Category name is too long",
            json!({ "field": "name", "max_length": MAX_CATEGORY_NAME_LEN }),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockCategoryRepository, MockSlugLookup};
    use chrono::Utc;
    use uuid::Uuid;

    fn category(id: Uuid, name: &str, slug: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn free_slugs() -> SlugGenerator {
        let mut lookup = MockSlugLookup::new();
        lookup.expect_slug_exists().returning(|_, _| Ok(false));
        SlugGenerator::new(Arc::new(lookup), "category")
    }

    fn unused_slugs() -> SlugGenerator {
        let mut lookup = MockSlugLookup::new();
        lookup.expect_slug_exists().times(0);
        SlugGenerator::new(Arc::new(lookup), "category")
    }

    #[tokio::test]
    async fn test_create_success() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_name_exists().times(1).returning(|_, _| Ok(false));
        repo.expect_create()
            .withf(|new| new.slug == "web-dev" && new.name == "Web Dev")
            .times(1)
            .returning(|new| Ok(category(Uuid::new_v4(), &new.name, &new.slug)));

        let service = CategoryService::new(Arc::new(repo), free_slugs());
        let result = service.create("  Web Dev ", "").await.unwrap();

        assert_eq!(result.slug, "web-dev");
    }

    #[tokio::test]
    async fn test_create_duplicate_name_is_conflict() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_name_exists().returning(|_, _| Ok(true));
        repo.expect_create().times(0);

        let service = CategoryService::new(Arc::new(repo), unused_slugs());
        let result = service.create("Web Dev", "").await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_empty_name_is_validation_error() {
        let repo = MockCategoryRepository::new();
        let service = CategoryService::new(Arc::new(repo), unused_slugs());

        let result = service.create("  ", "").await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_too_long_name_is_validation_error() {
        let repo = MockCategoryRepository::new();
        let service = CategoryService::new(Arc::new(repo), unused_slugs());

        let result = service.create(&"x".repeat(101), "").await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_retries_on_slug_race() {
        let mut repo = MockCategoryRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_name_exists().returning(|_, _| Ok(false));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(category(Uuid::new_v4(), &new.name, &new.slug)));

        let service = CategoryService::new(Arc::new(repo), free_slugs());
        assert!(service.create("Web Dev", "").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_same_name_keeps_slug() {
        let id = Uuid::new_v4();
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_slug()
            .returning(move |_| Ok(Some(category(id, "Web Dev", "web-dev"))));
        repo.expect_name_exists().times(0);
        repo.expect_update()
            .withf(|_, patch| {
                patch.slug.is_none() && patch.name.is_none() && patch.description.is_some()
            })
            .times(1)
            .returning(move |_, _| Ok(category(id, "Web Dev", "web-dev")));

        let service = CategoryService::new(Arc::new(repo), unused_slugs());
        let result = service
            .update("web-dev", Some("Web Dev".to_string()), Some("desc".to_string()))
            .await
            .unwrap();

        assert_eq!(result.slug, "web-dev");
    }

    #[tokio::test]
    async fn test_update_rename_regenerates_slug() {
        let id = Uuid::new_v4();
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_slug()
            .returning(move |_| Ok(Some(category(id, "Web Dev", "web-dev"))));
        repo.expect_name_exists()
            .withf(move |_, exclude| *exclude == Some(id))
            .returning(|_, _| Ok(false));
        repo.expect_update()
            .withf(|_, patch| patch.slug.as_deref() == Some("backend"))
            .times(1)
            .returning(move |_, patch| {
                Ok(category(id, patch.name.as_deref().unwrap_or(""), "backend"))
            });

        let service = CategoryService::new(Arc::new(repo), free_slugs());
        let result = service
            .update("web-dev", Some("Backend".to_string()), None)
            .await
            .unwrap();

        assert_eq!(result.slug, "backend");
        assert_eq!(result.name, "Backend");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_slug().returning(|_| Ok(None));

        let service = CategoryService::new(Arc::new(repo), unused_slugs());
        let result = service.get("nope").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_blank_search_is_ignored() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_list()
            .withf(|search, page, size| search.is_none() && *page == 1 && *size == 20)
            .returning(|_, _, _| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(0));

        let service = CategoryService::new(Arc::new(repo), unused_slugs());
        let (items, total) = service.list(Some("   ".to_string()), 1, 20).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
