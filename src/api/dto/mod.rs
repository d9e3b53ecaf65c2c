//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod activity;
pub mod category;
pub mod contact;
pub mod engagement;
pub mod health;
pub mod pagination;
pub mod snippet;
