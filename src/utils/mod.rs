//! Utility functions shared across layers.
//!
//! - [`slug`] - Slug normalization and random fallback generation

pub mod slug;
