//! Domain events published for out-of-band notification.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

/// An event emitted after a successful write.
///
/// Events travel over a bounded channel to
/// [`crate::domain::notification_worker::run_notification_worker`], which hands
/// them to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    ContactSubmitted {
        contact_id: i64,
        name: String,
        email: String,
        subject: String,
    },
    NewsletterSubscribed {
        email: String,
    },
    NewsletterUnsubscribed {
        email: String,
    },
}

impl DomainEvent {
    /// Short event name used in logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::ContactSubmitted { .. } => "contact_submitted",
            DomainEvent::NewsletterSubscribed { .. } => "newsletter_subscribed",
            DomainEvent::NewsletterUnsubscribed { .. } => "newsletter_unsubscribed",
        }
    }
}

/// Failure reported by a [`Notifier`].
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Worth retrying, e.g. the downstream service timed out.
    #[error("transient notification failure: {0}")]
    Transient(String),
    /// Retrying will not help.
    #[error("permanent notification failure: {0}")]
    Permanent(String),
}

impl NotifyError {
    pub fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Transient(_))
    }
}

/// Delivers domain events to an external collaborator such as a mailer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &DomainEvent) -> Result<(), NotifyError>;
}

/// Sending half of the event channel.
///
/// Publishing never blocks the request path: when the queue is full the event
/// is dropped and counted.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<DomainEvent>,
}

impl EventPublisher {
    pub fn new(tx: mpsc::Sender<DomainEvent>) -> Self {
        Self { tx }
    }

    /// Creates a publisher together with the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DomainEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// True once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn publish(&self, event: DomainEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("notifications_dropped_total", "kind" => event.kind())
                    .increment(1);
                tracing::warn!(kind = event.kind(), "Event queue full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("notifications_dropped_total", "kind" => event.kind())
                    .increment(1);
                tracing::warn!(kind = event.kind(), "Event queue closed, dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscribed(email: &str) -> DomainEvent {
        DomainEvent::NewsletterSubscribed {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_delivers_event() {
        let (publisher, mut rx) = EventPublisher::channel(4);
        publisher.publish(subscribed("a@example.com"));

        assert_eq!(rx.recv().await, Some(subscribed("a@example.com")));
    }

    #[tokio::test]
    async fn test_publish_drops_when_full() {
        let (publisher, mut rx) = EventPublisher::channel(1);
        publisher.publish(subscribed("first@example.com"));
        publisher.publish(subscribed("second@example.com"));

        assert_eq!(rx.recv().await, Some(subscribed("first@example.com")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_after_receiver_dropped_does_not_panic() {
        let (publisher, rx) = EventPublisher::channel(1);
        assert!(!publisher.is_closed());
        drop(rx);
        assert!(publisher.is_closed());
        publisher.publish(subscribed("gone@example.com"));
    }

    #[test]
    fn test_capacity_reports_free_slots() {
        let (publisher, _rx) = EventPublisher::channel(2);
        assert_eq!(publisher.capacity(), 2);
        publisher.publish(subscribed("a@example.com"));
        assert_eq!(publisher.capacity(), 1);
    }

    #[test]
    fn test_event_kind() {
        let event = DomainEvent::ContactSubmitted {
            contact_id: 1,
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            subject: "Hi".to_string(),
        };
        assert_eq!(event.kind(), "contact_submitted");
        assert!(NotifyError::Transient("x".into()).is_transient());
        assert!(!NotifyError::Permanent("x".into()).is_transient());
    }
}
