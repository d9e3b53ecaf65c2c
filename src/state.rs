//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    ActivityService, CategoryService, ContactService, EngagementService, NewsletterService,
    SlugGenerator, SnippetService,
};
use crate::domain::clock::Clock;
use crate::domain::events::EventPublisher;
use crate::domain::repositories::{
    CategoryRepository, CommentRepository, ContactRepository, HistoryRepository,
    ReactionRepository, RunRepository, ShareRepository, SlugLookup, SnippetRepository,
    SubscriberRepository,
};
use crate::infrastructure::memory::{
    MemoryCategoryRepository, MemoryCommentRepository, MemoryContactRepository,
    MemoryHistoryRepository, MemoryReactionRepository, MemoryRunRepository,
    MemoryShareRepository, MemorySnippetRepository, MemoryStore, MemorySubscriberRepository,
};
use crate::infrastructure::persistence::{
    PgCategoryRepository, PgCommentRepository, PgContactRepository, PgHistoryRepository,
    PgReactionRepository, PgRunRepository, PgShareRepository, PgSnippetRepository,
    PgSubscriberRepository,
};

pub type SharedCategoryService = CategoryService<dyn CategoryRepository>;
pub type SharedSnippetService = SnippetService<dyn SnippetRepository, dyn CategoryRepository>;
pub type SharedEngagementService =
    EngagementService<dyn HistoryRepository, dyn ReactionRepository, dyn SnippetRepository>;
pub type SharedActivityService =
    ActivityService<dyn CommentRepository, dyn ShareRepository, dyn RunRepository>;

/// One storage backend, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub category_slugs: Arc<dyn SlugLookup>,
    pub snippets: Arc<dyn SnippetRepository>,
    pub snippet_slugs: Arc<dyn SlugLookup>,
    pub history: Arc<dyn HistoryRepository>,
    pub reactions: Arc<dyn ReactionRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub shares: Arc<dyn ShareRepository>,
    pub runs: Arc<dyn RunRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        let categories = Arc::new(PgCategoryRepository::new(pool.clone()));
        let snippets = Arc::new(PgSnippetRepository::new(pool.clone()));

        Self {
            categories: categories.clone(),
            category_slugs: categories,
            snippets: snippets.clone(),
            snippet_slugs: snippets,
            history: Arc::new(PgHistoryRepository::new(pool.clone())),
            reactions: Arc::new(PgReactionRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            shares: Arc::new(PgShareRepository::new(pool.clone())),
            runs: Arc::new(PgRunRepository::new(pool.clone())),
            contacts: Arc::new(PgContactRepository::new(pool.clone())),
            subscribers: Arc::new(PgSubscriberRepository::new(pool)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        let categories = Arc::new(MemoryCategoryRepository::new(store.clone()));
        let snippets = Arc::new(MemorySnippetRepository::new(store.clone()));

        Self {
            categories: categories.clone(),
            category_slugs: categories,
            snippets: snippets.clone(),
            snippet_slugs: snippets,
            history: Arc::new(MemoryHistoryRepository::new(store.clone())),
            reactions: Arc::new(MemoryReactionRepository::new(store.clone())),
            comments: Arc::new(MemoryCommentRepository::new(store.clone())),
            shares: Arc::new(MemoryShareRepository::new(store.clone())),
            runs: Arc::new(MemoryRunRepository::new(store.clone())),
            contacts: Arc::new(MemoryContactRepository::new(store.clone())),
            subscribers: Arc::new(MemorySubscriberRepository::new(store)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<SharedCategoryService>,
    pub snippet_service: Arc<SharedSnippetService>,
    pub engagement_service: Arc<SharedEngagementService>,
    pub activity_service: Arc<SharedActivityService>,
    pub contact_service: Arc<ContactService<dyn ContactRepository>>,
    pub newsletter_service: Arc<NewsletterService<dyn SubscriberRepository>>,
    pub events: EventPublisher,
    /// `None` when running on the in-memory store.
    pub db: Option<PgPool>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client addresses.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires every service over one set of repositories.
    pub fn new(
        repos: Repositories,
        events: EventPublisher,
        clock: Arc<dyn Clock>,
        db: Option<PgPool>,
        behind_proxy: bool,
    ) -> Self {
        let category_slugs = SlugGenerator::new(repos.category_slugs, "category");
        let snippet_slugs = SlugGenerator::new(repos.snippet_slugs, "snippet");

        Self {
            category_service: Arc::new(CategoryService::new(
                repos.categories.clone(),
                category_slugs,
            )),
            snippet_service: Arc::new(SnippetService::new(
                repos.snippets.clone(),
                repos.categories,
                snippet_slugs,
                clock.clone(),
            )),
            engagement_service: Arc::new(EngagementService::new(
                repos.history,
                repos.reactions,
                repos.snippets,
                clock.clone(),
            )),
            activity_service: Arc::new(ActivityService::new(
                repos.comments,
                repos.shares,
                repos.runs,
            )),
            contact_service: Arc::new(ContactService::new(repos.contacts, events.clone())),
            newsletter_service: Arc::new(NewsletterService::new(
                repos.subscribers,
                events.clone(),
                clock,
            )),
            events,
            db,
            behind_proxy,
        }
    }
}
