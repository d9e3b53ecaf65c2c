//! DTOs for snippet endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use super::pagination::PaginationParams;
use crate::application::services::{SnippetChanges, SnippetInput, SnippetQuery};
use crate::domain::entities::{
    EngagementSummary, Language, OutputType, Snippet, SnippetFilter, SnippetOrdering,
};
use crate::error::AppError;
use serde_json::json;

/// Request body for `POST /api/snippets`.
///
/// `category` is a category slug.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSnippetRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(length(max = 160))]
    pub short_description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub tags: String,

    pub language: Language,

    #[serde(default)]
    pub output_type: OutputType,

    #[serde(default)]
    pub code_content: String,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    pub additional_files: Option<Value>,
    pub simulated_output: Option<String>,
    pub expected_result: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub thumbnail_image: Option<String>,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default = "default_difficulty")]
    pub difficulty: i16,

    pub category: Option<String>,
}

fn default_difficulty() -> i16 {
    1
}

impl CreateSnippetRequest {
    pub fn into_input(self, uploaded_by: Option<i64>) -> SnippetInput {
        SnippetInput {
            title: self.title,
            description: self.description,
            short_description: self.short_description,
            tags: self.tags,
            language: self.language,
            output_type: self.output_type,
            code_content: self.code_content,
            html_code: self.html_code,
            css_code: self.css_code,
            js_code: self.js_code,
            additional_files: self.additional_files,
            simulated_output: self.simulated_output,
            expected_result: self.expected_result,
            thumbnail_image: self.thumbnail_image,
            is_featured: self.is_featured,
            difficulty: self.difficulty,
            category: self.category,
            uploaded_by,
        }
    }
}

/// Request body for `PATCH /api/snippets/{slug}`.
///
/// For nullable fields, an absent key leaves the value unchanged and `null`
/// clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSnippetRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,

    #[validate(length(max = 160))]
    pub short_description: Option<String>,

    #[validate(length(max = 200))]
    pub tags: Option<String>,
    pub language: Option<Language>,
    pub output_type: Option<OutputType>,
    pub code_content: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub html_code: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub css_code: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub js_code: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub additional_files: Option<Option<Value>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub simulated_output: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expected_result: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub thumbnail_image: Option<Option<String>>,

    pub is_featured: Option<bool>,
    pub difficulty: Option<i16>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
}

impl From<UpdateSnippetRequest> for SnippetChanges {
    fn from(req: UpdateSnippetRequest) -> Self {
        SnippetChanges {
            title: req.title,
            description: req.description,
            short_description: req.short_description,
            tags: req.tags,
            language: req.language,
            output_type: req.output_type,
            code_content: req.code_content,
            html_code: req.html_code,
            css_code: req.css_code,
            js_code: req.js_code,
            additional_files: req.additional_files,
            simulated_output: req.simulated_output,
            expected_result: req.expected_result,
            thumbnail_image: req.thumbnail_image,
            is_featured: req.is_featured,
            difficulty: req.difficulty,
            category: req.category,
        }
    }
}

/// Query parameters for snippet listings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct SnippetListQuery {
    pub language: Option<String>,
    pub output_type: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub difficulty: Option<i16>,

    pub category: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub is_featured: Option<bool>,

    pub tag: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

fn invalid_param(field: &str, err: impl std::fmt::Display) -> AppError {
    AppError::bad_request(err.to_string(), json!({ "field": field }))
}

impl SnippetListQuery {
    /// Parses the string parameters into a listing query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown language, output type
    /// or ordering key.
    pub fn to_query(&self) -> Result<SnippetQuery, AppError> {
        let language = self
            .language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()
            .map_err(|e| invalid_param("language", e))?;
        let output_type = self
            .output_type
            .as_deref()
            .map(str::parse::<OutputType>)
            .transpose()
            .map_err(|e| invalid_param("output_type", e))?;
        let ordering = self
            .ordering
            .as_deref()
            .map(str::parse::<SnippetOrdering>)
            .transpose()
            .map_err(|e| invalid_param("ordering", e))?
            .unwrap_or_default();

        Ok(SnippetQuery {
            category: self.category.clone(),
            filter: SnippetFilter {
                language,
                output_type,
                difficulty: self.difficulty,
                category_id: None,
                is_featured: self.is_featured,
                tag: self.tag.clone().filter(|t| !t.trim().is_empty()),
                search: self.search.clone(),
                ordering,
            },
        })
    }
}

/// Snippet as returned in listings.
#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub tag_list: Vec<String>,
}

impl From<Snippet> for SnippetResponse {
    fn from(snippet: Snippet) -> Self {
        let tag_list = snippet.tag_list().into_iter().map(String::from).collect();
        Self { snippet, tag_list }
    }
}

/// Snippet with its engagement numbers.
#[derive(Debug, Serialize)]
pub struct SnippetDetailResponse {
    #[serde(flatten)]
    pub snippet: SnippetResponse,
    pub engagement: EngagementSummary,
}
