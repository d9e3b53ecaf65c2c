//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and notification delivery.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-memory repository implementations
//! - [`notifier`] - Default event notifier

pub mod memory;
pub mod notifier;
pub mod persistence;
