//! Domain layer containing business entities and logic.
//!
//! This module defines entities, repository interfaces, domain events and the
//! notification worker, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`events`] - Domain events, the [`events::Notifier`] port and the publisher
//! - [`notification_worker`] - Asynchronous event delivery
//! - [`clock`] - Time source
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Notification Flow
//!
//! 1. A service completes a write (contact form, newsletter change)
//! 2. [`events::DomainEvent`] is published on a bounded channel
//! 3. [`notification_worker::run_notification_worker`] delivers it with retry logic
//! 4. The configured [`events::Notifier`] handles the event

pub mod clock;
pub mod entities;
pub mod events;
pub mod notification_worker;
pub mod repositories;
