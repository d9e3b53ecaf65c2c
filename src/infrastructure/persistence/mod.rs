//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow`.
//!
//! # Repositories
//!
//! - [`PgCategoryRepository`] / [`PgSnippetRepository`] - Catalog storage, also slug lookups
//! - [`PgHistoryRepository`] / [`PgReactionRepository`] - Engagement counters
//! - [`PgCommentRepository`] - Threaded comments
//! - [`PgShareRepository`] / [`PgRunRepository`] - Share and code-run logs
//! - [`PgContactRepository`] / [`PgSubscriberRepository`] - Contact form and newsletter

pub mod pg_activity_log_repository;
pub mod pg_category_repository;
pub mod pg_comment_repository;
pub mod pg_contact_repository;
pub mod pg_history_repository;
pub mod pg_reaction_repository;
pub mod pg_snippet_repository;
pub mod pg_subscriber_repository;

pub use pg_activity_log_repository::{PgRunRepository, PgShareRepository};
pub use pg_category_repository::PgCategoryRepository;
pub use pg_comment_repository::PgCommentRepository;
pub use pg_contact_repository::PgContactRepository;
pub use pg_history_repository::PgHistoryRepository;
pub use pg_reaction_repository::PgReactionRepository;
pub use pg_snippet_repository::PgSnippetRepository;
pub use pg_subscriber_repository::PgSubscriberRepository;

/// Wraps user text in `%...%` for `ILIKE`, escaping the pattern metacharacters.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
