//! Unique slug derivation for named entities.

use std::sync::Arc;

use crate::domain::repositories::SlugLookup;
use crate::error::AppError;
use crate::utils::slug;
use serde_json::json;
use uuid::Uuid;

/// Produces slugs that are unique within one entity type.
///
/// Generation is read-only: the caller persists the returned slug, and the
/// store's unique index catches any race between check and insert.
#[derive(Clone)]
pub struct SlugGenerator {
    lookup: Arc<dyn SlugLookup>,
    prefix: &'static str,
}

impl SlugGenerator {
    /// Creates a generator over `lookup`.
    ///
    /// `prefix` names the entity type in fallback slugs, e.g. `"snippet"`.
    pub fn new(lookup: Arc<dyn SlugLookup>, prefix: &'static str) -> Self {
        Self { lookup, prefix }
    }

    /// Derives a free slug for `name`.
    ///
    /// The normalized base is returned when free; otherwise `base-1`,
    /// `base-2`, ... are tried in order. The row `existing_id` is ignored
    /// during the check, so renaming an entity to a name with the same base
    /// keeps its slug.
    ///
    /// A name with no alphanumeric content gets `<prefix>-<8 hex chars>` as
    /// its base.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `name` is empty or whitespace.
    /// Returns [`AppError::Internal`] if the lookup fails.
    pub async fn generate(
        &self,
        name: &str,
        existing_id: Option<Uuid>,
    ) -> Result<String, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "Name must not be empty",
                json!({ "entity": self.prefix }),
            ));
        }

        let base = match slug::normalize(name) {
            base if base.is_empty() => slug::random_fallback(self.prefix)?,
            base => base,
        };

        let mut n = 0u64;
        loop {
            let candidate = slug::with_suffix(&base, n);
            if !self.lookup.slug_exists(&candidate, existing_id).await? {
                tracing::debug!(slug = %candidate, attempts = n + 1, "Slug generated");
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockSlugLookup;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn generator(lookup: MockSlugLookup) -> SlugGenerator {
        SlugGenerator::new(Arc::new(lookup), "category")
    }

    fn taken(slugs: &[&str]) -> MockSlugLookup {
        let taken: HashSet<String> = slugs.iter().map(|s| s.to_string()).collect();
        let mut lookup = MockSlugLookup::new();
        lookup
            .expect_slug_exists()
            .returning(move |slug, _| Ok(taken.contains(slug)));
        lookup
    }

    #[tokio::test]
    async fn test_generate_free_base() {
        let result = generator(taken(&[])).generate("Web Dev", None).await;
        assert_eq!(result.unwrap(), "web-dev");
    }

    #[tokio::test]
    async fn test_generate_appends_counter_on_collision() {
        let result = generator(taken(&["web-dev", "web-dev-1"]))
            .generate("Web Dev", None)
            .await;
        assert_eq!(result.unwrap(), "web-dev-2");
    }

    #[tokio::test]
    async fn test_generate_nth_duplicate_gets_suffix_n() {
        let store = Arc::new(Mutex::new(HashSet::<String>::new()));
        let lookup_store = store.clone();

        let mut lookup = MockSlugLookup::new();
        lookup
            .expect_slug_exists()
            .returning(move |slug, _| Ok(lookup_store.lock().unwrap().contains(slug)));
        let generator = generator(lookup);

        for n in 0..5 {
            let slug = generator.generate("Web Dev", None).await.unwrap();
            let expected = if n == 0 {
                "web-dev".to_string()
            } else {
                format!("web-dev-{n}")
            };
            assert_eq!(slug, expected);
            store.lock().unwrap().insert(slug);
        }
    }

    #[tokio::test]
    async fn test_generate_passes_existing_id() {
        let id = Uuid::new_v4();
        let mut lookup = MockSlugLookup::new();
        lookup
            .expect_slug_exists()
            .withf(move |slug, exclude| slug == "web-dev" && *exclude == Some(id))
            .times(1)
            .returning(|_, _| Ok(false));

        let result = generator(lookup).generate("web dev", Some(id)).await;
        assert_eq!(result.unwrap(), "web-dev");
    }

    #[tokio::test]
    async fn test_generate_empty_name_is_validation_error() {
        let mut lookup = MockSlugLookup::new();
        lookup.expect_slug_exists().times(0);

        let result = generator(lookup).generate("   ", None).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_generate_punctuation_only_falls_back_to_prefix() {
        let slug = generator(taken(&[])).generate("!!!", None).await.unwrap();

        let suffix = slug.strip_prefix("category-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_generate_propagates_lookup_error() {
        let mut lookup = MockSlugLookup::new();
        lookup
            .expect_slug_exists()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let result = generator(lookup).generate("Web Dev", None).await;
        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }
}
