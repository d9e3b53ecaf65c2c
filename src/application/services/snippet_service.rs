//! Snippet creation, browsing and content rules.

use std::sync::Arc;

use crate::application::services::engagement_service::MAX_CONFLICT_RETRIES;
use crate::application::services::slug_generator::SlugGenerator;
use crate::domain::clock::Clock;
use crate::domain::entities::{
    DEFAULT_SIMULATED_OUTPUT, EngagementSummary, Language, MAX_DIFFICULTY, MIN_DIFFICULTY,
    NewSnippet, OutputType, SHORT_DESCRIPTION_LEN, Snippet, SnippetFilter, SnippetPatch,
};
use crate::domain::repositories::{CategoryRepository, SnippetRepository};
use crate::error::AppError;
use serde_json::{Value, json};
use uuid::Uuid;

/// Snippet data as submitted for creation. The category is referenced by slug.
#[derive(Debug, Clone, Default)]
pub struct SnippetInput {
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub tags: String,
    pub language: Language,
    pub output_type: OutputType,
    pub code_content: String,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    pub additional_files: Option<Value>,
    pub simulated_output: Option<String>,
    pub expected_result: Option<String>,
    pub thumbnail_image: Option<String>,
    pub is_featured: bool,
    pub difficulty: i16,
    pub category: Option<String>,
    pub uploaded_by: Option<i64>,
}

/// Partial snippet update. Same conventions as [`SnippetPatch`], with the
/// category referenced by slug.
#[derive(Debug, Clone, Default)]
pub struct SnippetChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub tags: Option<String>,
    pub language: Option<Language>,
    pub output_type: Option<OutputType>,
    pub code_content: Option<String>,
    pub html_code: Option<Option<String>>,
    pub css_code: Option<Option<String>>,
    pub js_code: Option<Option<String>>,
    pub additional_files: Option<Option<Value>>,
    pub simulated_output: Option<Option<String>>,
    pub expected_result: Option<Option<String>>,
    pub thumbnail_image: Option<Option<String>>,
    pub is_featured: Option<bool>,
    pub difficulty: Option<i16>,
    pub category: Option<Option<String>>,
}

/// Listing filters as received from the API, before category resolution.
#[derive(Debug, Clone, Default)]
pub struct SnippetQuery {
    pub category: Option<String>,
    pub filter: SnippetFilter,
}

pub struct SnippetService<S, C>
where
    S: SnippetRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    snippet_repository: Arc<S>,
    category_repository: Arc<C>,
    slugs: SlugGenerator,
    clock: Arc<dyn Clock>,
}

impl<S, C> SnippetService<S, C>
where
    S: SnippetRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    pub fn new(
        snippet_repository: Arc<S>,
        category_repository: Arc<C>,
        slugs: SlugGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            snippet_repository,
            category_repository,
            slugs,
            clock,
        }
    }

    /// Validates and stores a new snippet.
    ///
    /// # Content Rules
    ///
    /// - html, css and javascript snippets need at least one of
    ///   `html_code`, `css_code`, `js_code`
    /// - python, java and cpp snippets need `code_content`
    /// - python, java, cpp and javascript get a placeholder
    ///   `simulated_output` when none is given
    /// - `difficulty` is 1 to 3
    /// - `short_description` defaults to the first 160 characters of the
    ///   description
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a rule is violated or the category
    /// does not exist.
    /// Returns [`AppError::Conflict`] if slug races kept failing after
    /// [`MAX_CONFLICT_RETRIES`] retries.
    pub async fn create(&self, input: SnippetInput) -> Result<Snippet, AppError> {
        let title = input.title.trim().to_string();
        validate_difficulty(input.difficulty)?;
        validate_content(
            input.language,
            &input.code_content,
            [&input.html_code, &input.css_code, &input.js_code],
        )?;

        let category_id = match &input.category {
            Some(slug) => Some(self.resolve_category(slug).await?),
            None => None,
        };

        let short_description =
            short_description(input.short_description.as_deref(), &input.description)?;
        let simulated_output = default_output(input.language, input.simulated_output);

        let mut new_snippet = NewSnippet {
            title,
            slug: String::new(),
            description: input.description,
            short_description,
            tags: normalize_tags(&input.tags),
            language: input.language,
            output_type: input.output_type,
            code_content: input.code_content,
            html_code: input.html_code,
            css_code: input.css_code,
            js_code: input.js_code,
            additional_files: input.additional_files,
            simulated_output,
            expected_result: input.expected_result,
            thumbnail_image: input.thumbnail_image,
            is_featured: input.is_featured,
            difficulty: input.difficulty,
            category_id,
            uploaded_by: input.uploaded_by,
        };

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            new_snippet.slug = self.slugs.generate(&new_snippet.title, None).await?;

            match self.snippet_repository.create(new_snippet.clone()).await {
                Ok(snippet) => {
                    tracing::info!(
                        slug = %snippet.slug,
                        language = %snippet.language,
                        "Snippet created"
                    );
                    return Ok(snippet);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!(attempt, "Snippet insert conflicted, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            AppError::conflict("Snippet slug conflict", json!({ "title": new_snippet.title }))
        }))
    }

    /// Lists snippets, resolving the category slug filter first.
    ///
    /// An unknown category slug yields an empty page rather than an error.
    pub async fn list(
        &self,
        query: SnippetQuery,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Snippet>, i64), AppError> {
        let mut filter = query.filter;

        if let Some(slug) = &query.category {
            match self.category_repository.find_by_slug(slug).await? {
                Some(category) => filter.category_id = Some(category.id),
                None => return Ok((vec![], 0)),
            }
        }

        if let Some(search) = &filter.search {
            let trimmed = search.trim();
            filter.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        let items = self
            .snippet_repository
            .list(filter.clone(), page, page_size)
            .await?;
        let total = self.snippet_repository.count(filter).await?;
        Ok((items, total))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no snippet has this slug.
    pub async fn get(&self, slug: &str) -> Result<Snippet, AppError> {
        self.snippet_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Snippet not found", json!({ "slug": slug })))
    }

    /// Fetches a snippet with its engagement numbers and stamps `last_accessed`.
    pub async fn get_detail(&self, slug: &str) -> Result<(Snippet, EngagementSummary), AppError> {
        let mut snippet = self.get(slug).await?;

        let now = self.clock.now();
        self.snippet_repository.touch_accessed(snippet.id, now).await?;
        snippet.last_accessed = Some(now);

        let summary = self.snippet_repository.engagement_summary(snippet.id).await?;
        Ok((snippet, summary))
    }

    /// Applies a partial update.
    ///
    /// Content rules are checked against the snippet as it will look after the
    /// update. The slug is regenerated only when the title changes.
    pub async fn update(&self, slug: &str, changes: SnippetChanges) -> Result<Snippet, AppError> {
        let current = self.get(slug).await?;

        if let Some(difficulty) = changes.difficulty {
            validate_difficulty(difficulty)?;
        }

        let language = changes.language.unwrap_or(current.language);
        let code_content = changes
            .code_content
            .as_deref()
            .unwrap_or(&current.code_content);
        let html_code = changes.html_code.clone().unwrap_or(current.html_code.clone());
        let css_code = changes.css_code.clone().unwrap_or(current.css_code.clone());
        let js_code = changes.js_code.clone().unwrap_or(current.js_code.clone());
        validate_content(language, code_content, [&html_code, &css_code, &js_code])?;

        let description = changes
            .description
            .clone()
            .unwrap_or_else(|| current.description.clone());
        let short_description = match (&changes.short_description, &changes.description) {
            (Some(short), _) => Some(short_description(Some(short), &description)?),
            (None, Some(_)) if current.short_description.is_empty() => {
                Some(short_description(None, &description)?)
            }
            _ => None,
        };

        let simulated_output = {
            let effective = changes
                .simulated_output
                .clone()
                .unwrap_or(current.simulated_output.clone());
            let defaulted = default_output(language, effective.clone());
            (changes.simulated_output.is_some() || defaulted != effective).then_some(defaulted)
        };

        let category_id = match &changes.category {
            Some(Some(slug)) => Some(Some(self.resolve_category(slug).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let new_title = changes
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| *t != current.title)
            .map(str::to_string);

        let mut patch = SnippetPatch {
            title: new_title.clone(),
            slug: None,
            description: changes.description,
            short_description,
            tags: changes.tags.as_deref().map(normalize_tags),
            language: changes.language,
            output_type: changes.output_type,
            code_content: changes.code_content,
            html_code: changes.html_code,
            css_code: changes.css_code,
            js_code: changes.js_code,
            additional_files: changes.additional_files,
            simulated_output,
            expected_result: changes.expected_result,
            thumbnail_image: changes.thumbnail_image,
            is_featured: changes.is_featured,
            difficulty: changes.difficulty,
            category_id,
        };

        let Some(title) = new_title else {
            return self.snippet_repository.update(current.id, patch).await;
        };

        let mut last_conflict = None;
        for attempt in 0..=MAX_CONFLICT_RETRIES {
            patch.slug = Some(self.slugs.generate(&title, Some(current.id)).await?);

            match self.snippet_repository.update(current.id, patch.clone()).await {
                Ok(updated) => return Ok(updated),
                Err(e) if e.is_conflict() => {
                    tracing::debug!(attempt, "Snippet rename conflicted, retrying");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            AppError::conflict("Snippet slug conflict", json!({ "title": title }))
        }))
    }

    pub async fn delete(&self, slug: &str) -> Result<(), AppError> {
        let snippet = self.get(slug).await?;

        if !self.snippet_repository.delete(snippet.id).await? {
            return Err(AppError::not_found("Snippet not found", json!({ "slug": slug })));
        }

        tracing::info!(slug, "Snippet deleted");
        Ok(())
    }

    async fn resolve_category(&self, slug: &str) -> Result<Uuid, AppError> {
        self.category_repository
            .find_by_slug(slug)
            .await?
            .map(|c| c.id)
            .ok_or_else(|| {
                AppError::bad_request(
                    "Category does not exist",
                    json!({ "field": "category", "slug": slug }),
                )
            })
    }
}

fn validate_difficulty(difficulty: i16) -> Result<(), AppError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(AppError::bad_request(
            "Difficulty must be between 1 and 3",
            json!({ "field": "difficulty", "value": difficulty }),
        ));
    }
    Ok(())
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn validate_content(
    language: Language,
    code_content: &str,
    web_parts: [&Option<String>; 3],
) -> Result<(), AppError> {
    if language.is_web() && !web_parts.into_iter().any(present) {
        return Err(AppError::bad_request(
            "Web snippets require at least one of html_code, css_code, or js_code",
            json!({ "field": "code_content", "language": language.as_str() }),
        ));
    }

    if language.is_console() && code_content.trim().is_empty() {
        return Err(AppError::bad_request(
            "Console snippets require code_content",
            json!({ "field": "code_content", "language": language.as_str() }),
        ));
    }

    Ok(())
}

fn default_output(language: Language, simulated_output: Option<String>) -> Option<String> {
    if language.has_default_output() && !present(&simulated_output) {
        return Some(DEFAULT_SIMULATED_OUTPUT.to_string());
    }
    simulated_output
}

fn short_description(given: Option<&str>, description: &str) -> Result<String, AppError> {
    match given.map(str::trim).filter(|s| !s.is_empty()) {
        Some(short) if short.chars().count() > SHORT_DESCRIPTION_LEN => Err(AppError::bad_request(
            "Short description is too long",
            json!({ "field": "short_description", "max_length": SHORT_DESCRIPTION_LEN }),
        )),
        Some(short) => Ok(short.to_string()),
        None => Ok(description.chars().take(SHORT_DESCRIPTION_LEN).collect()),
    }
}

/// Trims every tag and drops empty ones: `" a, ,b "` becomes `"a,b"`.
fn normalize_tags(tags: &str) -> String {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
