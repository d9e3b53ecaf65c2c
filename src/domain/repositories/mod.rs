//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-memory implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`CategoryRepository`] / [`SnippetRepository`] - Catalog CRUD
//! - [`SlugLookup`] - Slug existence checks for slug generation
//! - [`HistoryRepository`] / [`ReactionRepository`] - Engagement counters
//! - [`CommentRepository`], [`ShareRepository`], [`RunRepository`] - Snippet activity
//! - [`ContactRepository`] / [`SubscriberRepository`] - Contact form and newsletter
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod category_repository;
pub mod comment_repository;
pub mod contact_repository;
pub mod history_repository;
pub mod reaction_repository;
pub mod run_repository;
pub mod share_repository;
pub mod slug_lookup;
pub mod snippet_repository;
pub mod subscriber_repository;

pub use category_repository::CategoryRepository;
pub use comment_repository::CommentRepository;
pub use contact_repository::ContactRepository;
pub use history_repository::HistoryRepository;
pub use reaction_repository::ReactionRepository;
pub use run_repository::RunRepository;
pub use share_repository::ShareRepository;
pub use slug_lookup::SlugLookup;
pub use snippet_repository::SnippetRepository;
pub use subscriber_repository::SubscriberRepository;

#[cfg(test)]
pub use category_repository::MockCategoryRepository;
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
#[cfg(test)]
pub use contact_repository::MockContactRepository;
#[cfg(test)]
pub use history_repository::MockHistoryRepository;
#[cfg(test)]
pub use reaction_repository::MockReactionRepository;
#[cfg(test)]
pub use run_repository::MockRunRepository;
#[cfg(test)]
pub use share_repository::MockShareRepository;
#[cfg(test)]
pub use slug_lookup::MockSlugLookup;
#[cfg(test)]
pub use snippet_repository::MockSnippetRepository;
#[cfg(test)]
pub use subscriber_repository::MockSubscriberRepository;
