//! Slug normalization and random fallback generation.
//!
//! A slug is lowercase ASCII letters, digits and single hyphens, never
//! starting or ending with a hyphen. Uniqueness is resolved by
//! [`crate::application::services::SlugGenerator`].

use crate::error::AppError;
use serde_json::json;

/// Random bytes in a fallback slug suffix (8 hex characters).
const FALLBACK_SUFFIX_BYTES: usize = 4;

/// Longest slug base. Leaves room for a `-<u64>` counter suffix within the
/// narrowest slug column (`categories.slug VARCHAR(120)`).
pub const MAX_BASE_LEN: usize = 96;

/// Normalizes a display name into a slug base.
///
/// Non-ASCII text is transliterated, letters are lowercased and every run of
/// other characters becomes a single hyphen. The result may be empty when the
/// name has no alphanumeric content.
///
/// Transliteration can grow a name several times over, so the base is cut to
/// [`MAX_BASE_LEN`] at the last hyphen that fits, or mid-word when there is
/// none.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("Hello World"), "hello-world");
/// assert_eq!(normalize("  Café -- Déjà  "), "cafe-deja");
/// assert_eq!(normalize("!!!"), "");
/// ```
pub fn normalize(name: &str) -> String {
    let mut base = ::slug::slugify(name);
    if base.len() <= MAX_BASE_LEN {
        return base;
    }

    // slugify output is ASCII, so any byte index is a char boundary.
    let cut = match base[..=MAX_BASE_LEN].rfind('-') {
        Some(i) if i > 0 => i,
        _ => MAX_BASE_LEN,
    };
    base.truncate(cut);
    base.truncate(base.trim_end_matches('-').len());
    base
}

/// Builds the `n`-th candidate for a base: `base` itself, then `base-1`, `base-2`, ...
pub fn with_suffix(base: &str, n: u64) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

/// Generates `<prefix>-<8 random hex chars>` for names that normalize to nothing.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn random_fallback(prefix: &str) -> Result<String, AppError> {
    let mut buffer = [0u8; FALLBACK_SUFFIX_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random slug",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(format!("{prefix}-{}", hex::encode(buffer)))
}

/// Checks the slug alphabet and hyphen placement.
pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_simple() {
        assert_eq!(normalize("Hello World"), "hello-world");
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("  Rust --  Async__Tips!  "), "rust-async-tips");
    }

    #[test]
    fn test_normalize_transliterates() {
        assert_eq!(normalize("Café Déjà Vu"), "cafe-deja-vu");
    }

    #[test]
    fn test_normalize_keeps_digits() {
        assert_eq!(normalize("Top 10 Tricks"), "top-10-tricks");
    }

    #[test]
    fn test_normalize_punctuation_only_is_empty() {
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_normalize_output_is_valid() {
        for name in ["Hello World", "C++ Basics", "  x  ", "Ünïcödé Têxt", "a/b\\c"] {
            let slug = normalize(name);
            assert!(is_valid(&slug), "'{name}' produced invalid slug '{slug}'");
        }
    }

    #[test]
    fn test_normalize_caps_transliterated_length() {
        let slug = normalize(&"中".repeat(100));

        assert!(slug.len() <= MAX_BASE_LEN);
        assert!(is_valid(&slug));
        assert!(with_suffix(&slug, u64::MAX).len() <= 120);
    }

    #[test]
    fn test_normalize_cuts_at_word_boundary() {
        let name = "algorithm ".repeat(20);
        let slug = normalize(&name);

        assert!(slug.len() <= MAX_BASE_LEN);
        assert!(slug.ends_with("algorithm"));
        assert!(is_valid(&slug));
    }

    #[test]
    fn test_normalize_cuts_long_single_word() {
        let slug = normalize(&"Æ".repeat(100));

        assert_eq!(slug.len(), MAX_BASE_LEN);
        assert!(is_valid(&slug));
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix("web-dev", 0), "web-dev");
        assert_eq!(with_suffix("web-dev", 1), "web-dev-1");
        assert_eq!(with_suffix("web-dev", 12), "web-dev-12");
    }

    #[test]
    fn test_random_fallback_format() {
        let slug = random_fallback("snippet").unwrap();
        let suffix = slug.strip_prefix("snippet-").unwrap();

        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(is_valid(&slug));
    }

    #[test]
    fn test_random_fallback_is_random() {
        let slugs: HashSet<String> = (0..100)
            .map(|_| random_fallback("category").unwrap())
            .collect();
        assert!(slugs.len() > 95);
    }

    #[test]
    fn test_is_valid_rejects_bad_slugs() {
        assert!(!is_valid(""));
        assert!(!is_valid("-abc"));
        assert!(!is_valid("abc-"));
        assert!(!is_valid("a--b"));
        assert!(!is_valid("Abc"));
        assert!(!is_valid("a_b"));
        assert!(is_valid("a-b-1"));
    }
}
