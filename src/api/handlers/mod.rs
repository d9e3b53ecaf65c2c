//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod activity;
pub mod categories;
pub mod comments;
pub mod contacts;
pub mod engagement;
pub mod health;
pub mod newsletter;
pub mod snippets;

pub use health::health_handler;
