//! Default notifier: writes each domain event to the log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::events::{DomainEvent, Notifier, NotifyError};

/// A [`Notifier`] that records events through `tracing` and never fails.
///
/// Stands in for a mailer; addresses are logged without the local part.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map_or("", |(_, domain)| domain)
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &DomainEvent) -> Result<(), NotifyError> {
        match event {
            DomainEvent::ContactSubmitted {
                contact_id,
                subject,
                email,
                ..
            } => info!(
                event = event.kind(),
                contact_id,
                subject = %subject,
                email_domain = email_domain(email),
                "New contact message"
            ),
            DomainEvent::NewsletterSubscribed { email }
            | DomainEvent::NewsletterUnsubscribed { email } => info!(
                event = event.kind(),
                email_domain = email_domain(email),
                "Newsletter change"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("ann@example.com"), "example.com");
        assert_eq!(email_domain("broken"), "");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let event = DomainEvent::NewsletterSubscribed {
            email: "ann@example.com".to_string(),
        };
        assert!(LogNotifier::new().notify(&event).await.is_ok());
    }
}
