//! Business logic services for the application layer.

pub mod activity_service;
pub mod category_service;
pub mod contact_service;
pub mod engagement_service;
pub mod newsletter_service;
pub mod slug_generator;
pub mod snippet_service;

pub use activity_service::ActivityService;
pub use category_service::CategoryService;
pub use contact_service::ContactService;
pub use engagement_service::{EngagementService, MAX_CONFLICT_RETRIES};
pub use newsletter_service::NewsletterService;
pub use slug_generator::SlugGenerator;
pub use snippet_service::{SnippetChanges, SnippetInput, SnippetQuery, SnippetService};
