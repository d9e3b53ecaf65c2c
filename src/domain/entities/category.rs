//! Category entity grouping snippets under a unique slug.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A named group of snippets.
///
/// `slug` is derived from `name` and unique across all categories.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Partial update for an existing category.
///
/// `None` fields are left unchanged. The service sets `slug` whenever `name`
/// changes.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Aggregated numbers shown on the category detail page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStats {
    pub snippet_count: i64,
    pub featured_snippet_count: i64,
    /// Snippet count per language code.
    pub languages: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_patch_default_is_empty() {
        let patch = CategoryPatch::default();
        assert!(patch.name.is_none());
        assert!(patch.slug.is_none());
        assert!(patch.description.is_none());
    }

    #[test]
    fn test_category_serializes_slug() {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: "Web Dev".to_string(),
            slug: "web-dev".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["slug"], "web-dev");
        assert_eq!(value["name"], "Web Dev");
    }
}
