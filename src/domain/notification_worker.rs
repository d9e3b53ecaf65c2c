//! Background worker delivering domain events.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_retry::{
    RetryIf,
    strategy::{ExponentialBackoff, jitter},
};

use crate::domain::events::{DomainEvent, Notifier, NotifyError};

/// Attempts after the first failed delivery.
const MAX_NOTIFY_RETRIES: usize = 3;

/// Consumes events until every sender is dropped.
///
/// Each event is delivered with exponential backoff (10ms base, capped at
/// 1s). Transient failures are retried up to [`MAX_NOTIFY_RETRIES`] times;
/// permanent failures and exhausted retries are logged and counted, never
/// propagated.
pub async fn run_notification_worker(
    mut rx: mpsc::Receiver<DomainEvent>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(event) = rx.recv().await {
        deliver(notifier.as_ref(), &event).await;
    }
    tracing::info!("Notification worker stopped");
}

async fn deliver(notifier: &dyn Notifier, event: &DomainEvent) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_NOTIFY_RETRIES);

    let result = RetryIf::start(
        strategy,
        || notifier.notify(event),
        |e: &NotifyError| {
            if e.is_transient() {
                tracing::debug!(kind = event.kind(), error = %e, "Retrying notification");
            }
            e.is_transient()
        },
    )
    .await;

    match result {
        Ok(()) => tracing::debug!(kind = event.kind(), "Notification delivered"),
        Err(e) => {
            metrics::counter!("notifications_failed_total", "kind" => event.kind()).increment(1);
            tracing::error!(kind = event.kind(), error = %e, "Notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::MockNotifier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> DomainEvent {
        DomainEvent::NewsletterUnsubscribed {
            email: "bye@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deliver_success_calls_once() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        deliver(&notifier, &event()).await;
    }

    #[tokio::test]
    async fn test_deliver_retries_transient_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(3).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(NotifyError::Transient("timeout".to_string()))
            } else {
                Ok(())
            }
        });

        deliver(&notifier, &event()).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_deliver_gives_up_after_max_retries() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(MAX_NOTIFY_RETRIES + 1)
            .returning(|_| Err(NotifyError::Transient("down".to_string())));

        deliver(&notifier, &event()).await;
    }

    #[tokio::test]
    async fn test_deliver_does_not_retry_permanent_failure() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(NotifyError::Permanent("bad address".to_string())));

        deliver(&notifier, &event()).await;
    }

    #[tokio::test]
    async fn test_worker_drains_channel_and_stops() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(2).returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(4);
        tx.send(event()).await.unwrap();
        tx.send(event()).await.unwrap();
        drop(tx);

        run_notification_worker(rx, Arc::new(notifier)).await;
    }
}
