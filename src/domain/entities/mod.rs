//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Category`] - A named group of snippets
//! - [`Snippet`] - A shared piece of code
//! - [`HistoryEntry`] / [`Reaction`] - Per-user engagement with a snippet
//! - [`Comment`], [`Share`], [`CodeRun`] - Activity logged against a snippet
//! - [`Contact`], [`Subscriber`], [`DeletedSubscriber`] - Contact form and newsletter
//!
//! # Design Pattern
//!
//! Entities come with separate structs for creation and partial updates:
//! - `NewCategory`, `NewSnippet`, `NewComment`, ... - For creating new records
//! - `CategoryPatch`, `SnippetPatch`, ... - For partial updates

pub mod activity;
pub mod category;
pub mod contact;
pub mod engagement;
pub mod snippet;

pub use activity::{
    CodeRun, Comment, CommentPatch, CommentThread, NewCodeRun, NewComment, NewShare, Share,
    ShareMethod,
};
pub use category::{Category, CategoryPatch, CategoryStats, NewCategory};
pub use contact::{Contact, ContactPatch, DeletedSubscriber, NewContact, Subscriber};
pub use engagement::{HistoryEntry, NewHistoryEntry, Reaction};
pub use snippet::{
    DEFAULT_SIMULATED_OUTPUT, EngagementSummary, Language, MAX_DIFFICULTY, MIN_DIFFICULTY,
    NewSnippet, OutputType, ParseEnumError, SHORT_DESCRIPTION_LEN, Snippet, SnippetFilter,
    SnippetOrderField, SnippetOrdering, SnippetPatch,
};
