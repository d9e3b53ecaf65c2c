//! Code snippet entity and its enumerations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a stored or submitted enum value is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Programming language of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Typescript,
    Html,
    Css,
    Nodejs,
    Java,
    Csharp,
    Cpp,
    Cee,
    Go,
    Rust,
    Django,
    React,
    Other,
}

impl Language {
    pub const ALL: [Language; 15] = [
        Language::Python,
        Language::Javascript,
        Language::Typescript,
        Language::Html,
        Language::Css,
        Language::Nodejs,
        Language::Java,
        Language::Csharp,
        Language::Cpp,
        Language::Cee,
        Language::Go,
        Language::Rust,
        Language::Django,
        Language::React,
        Language::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Nodejs => "nodejs",
            Language::Java => "java",
            Language::Csharp => "csharp",
            Language::Cpp => "cpp",
            Language::Cee => "cee",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Django => "django",
            Language::React => "react",
            Language::Other => "other",
        }
    }

    /// Languages rendered in a browser preview from html/css/js parts.
    pub fn is_web(&self) -> bool {
        matches!(self, Language::Html | Language::Css | Language::Javascript)
    }

    /// Languages that must ship `code_content` for console output.
    pub fn is_console(&self) -> bool {
        matches!(self, Language::Python | Language::Java | Language::Cpp)
    }

    /// Languages that get a placeholder `simulated_output` when none is given.
    pub fn has_default_output(&self) -> bool {
        matches!(
            self,
            Language::Python | Language::Java | Language::Cpp | Language::Javascript
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "language",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Language {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a snippet's result is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    #[default]
    Console,
    Browser,
    Api,
    Other,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Console => "console",
            OutputType::Browser => "browser",
            OutputType::Api => "api",
            OutputType::Other => "other",
        }
    }
}

impl FromStr for OutputType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(OutputType::Console),
            "browser" => Ok(OutputType::Browser),
            "api" => Ok(OutputType::Api),
            "other" => Ok(OutputType::Other),
            _ => Err(ParseEnumError {
                kind: "output type",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OutputType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Difficulty bounds: 1 Beginner, 2 Intermediate, 3 Advanced.
pub const MIN_DIFFICULTY: i16 = 1;
pub const MAX_DIFFICULTY: i16 = 3;

/// Placeholder output for console-style snippets submitted without one.
pub const DEFAULT_SIMULATED_OUTPUT: &str = "Output will be displayed here";

/// Maximum length of `short_description`.
pub const SHORT_DESCRIPTION_LEN: usize = 160;

/// A shared code snippet.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub short_description: String,
    pub tags: String,
    #[sqlx(try_from = "String")]
    pub language: Language,
    #[sqlx(try_from = "String")]
    pub output_type: OutputType,
    pub code_content: String,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    pub additional_files: Option<serde_json::Value>,
    pub simulated_output: Option<String>,
    pub expected_result: Option<String>,
    pub thumbnail_image: Option<String>,
    pub is_featured: bool,
    pub difficulty: i16,
    pub category_id: Option<Uuid>,
    pub uploaded_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Snippet {
    /// Tags split on commas, trimmed, empty entries dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Input data for creating a new snippet.
#[derive(Debug, Clone, Default)]
pub struct NewSnippet {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub short_description: String,
    pub tags: String,
    pub language: Language,
    pub output_type: OutputType,
    pub code_content: String,
    pub html_code: Option<String>,
    pub css_code: Option<String>,
    pub js_code: Option<String>,
    pub additional_files: Option<serde_json::Value>,
    pub simulated_output: Option<String>,
    pub expected_result: Option<String>,
    pub thumbnail_image: Option<String>,
    pub is_featured: bool,
    pub difficulty: i16,
    pub category_id: Option<Uuid>,
    pub uploaded_by: Option<i64>,
}

/// Partial update for an existing snippet.
///
/// `None` fields are unchanged. For nullable columns the outer `Option` means
/// "touch this field" and the inner one is the new value.
#[derive(Debug, Clone, Default)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub tags: Option<String>,
    pub language: Option<Language>,
    pub output_type: Option<OutputType>,
    pub code_content: Option<String>,
    pub html_code: Option<Option<String>>,
    pub css_code: Option<Option<String>>,
    pub js_code: Option<Option<String>>,
    pub additional_files: Option<Option<serde_json::Value>>,
    pub simulated_output: Option<Option<String>>,
    pub expected_result: Option<Option<String>>,
    pub thumbnail_image: Option<Option<String>>,
    pub is_featured: Option<bool>,
    pub difficulty: Option<i16>,
    pub category_id: Option<Option<Uuid>>,
}

/// Sort key for snippet listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnippetOrderField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Difficulty,
    Language,
}

/// Sort order for snippet listings, parsed from `created_at` / `-created_at` style keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetOrdering {
    pub field: SnippetOrderField,
    pub descending: bool,
}

impl Default for SnippetOrdering {
    fn default() -> Self {
        Self {
            field: SnippetOrderField::CreatedAt,
            descending: true,
        }
    }
}

impl FromStr for SnippetOrdering {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, key) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let field = match key {
            "created_at" => SnippetOrderField::CreatedAt,
            "updated_at" => SnippetOrderField::UpdatedAt,
            "title" => SnippetOrderField::Title,
            "difficulty" => SnippetOrderField::Difficulty,
            "language" => SnippetOrderField::Language,
            _ => {
                return Err(ParseEnumError {
                    kind: "ordering",
                    value: s.to_string(),
                });
            }
        };

        Ok(Self { field, descending })
    }
}

/// Filters for snippet listings. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct SnippetFilter {
    pub language: Option<Language>,
    pub output_type: Option<OutputType>,
    pub difficulty: Option<i16>,
    pub category_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    /// Single tag, matched case-insensitively against the comma-separated list.
    pub tag: Option<String>,
    /// Free text matched against title, description, code and tags.
    pub search: Option<String>,
    pub ordering: SnippetOrdering,
}

/// Engagement numbers shown on the snippet detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngagementSummary {
    pub like_count: i64,
    pub dislike_count: i64,
    pub comment_count: i64,
    /// Sum of all per-user view counts.
    pub view_count: i64,
    pub run_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trip_all() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_language_unknown() {
        let err = "cobol".parse::<Language>().unwrap_err();
        assert_eq!(err.kind, "language");
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_language_groups() {
        assert!(Language::Html.is_web());
        assert!(Language::Javascript.is_web());
        assert!(!Language::Python.is_web());
        assert!(Language::Cpp.is_console());
        assert!(!Language::Go.is_console());
        assert!(Language::Javascript.has_default_output());
        assert!(!Language::Rust.has_default_output());
    }

    #[test]
    fn test_language_serde_lowercase() {
        let value = serde_json::to_value(Language::Csharp).unwrap();
        assert_eq!(value, "csharp");
        let parsed: Language = serde_json::from_str("\"typescript\"").unwrap();
        assert_eq!(parsed, Language::Typescript);
    }

    #[test]
    fn test_output_type_parse() {
        assert_eq!("browser".parse::<OutputType>().unwrap(), OutputType::Browser);
        assert!("terminal".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_ordering_parse() {
        let ordering: SnippetOrdering = "-title".parse().unwrap();
        assert_eq!(ordering.field, SnippetOrderField::Title);
        assert!(ordering.descending);

        let ordering: SnippetOrdering = "difficulty".parse().unwrap();
        assert_eq!(ordering.field, SnippetOrderField::Difficulty);
        assert!(!ordering.descending);

        assert!("-views".parse::<SnippetOrdering>().is_err());
    }

    #[test]
    fn test_default_ordering_is_newest_first() {
        let ordering = SnippetOrdering::default();
        assert_eq!(ordering.field, SnippetOrderField::CreatedAt);
        assert!(ordering.descending);
    }
}
