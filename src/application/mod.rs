//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::SlugGenerator`] - Unique slug derivation
//! - [`services::CategoryService`] / [`services::SnippetService`] - Catalog management
//! - [`services::EngagementService`] - Views, saved state and reactions
//! - [`services::ActivityService`] - Comments, shares and code runs
//! - [`services::ContactService`] / [`services::NewsletterService`] - Contact form and newsletter

pub mod services;
