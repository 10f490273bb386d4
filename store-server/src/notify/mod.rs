//! Notification Module
//!
//! Fire-and-forget customer notifications (order confirmations). The
//! checkout path only enqueues; a background worker owns delivery, and
//! a failed or dropped notification never fails the order.

pub mod invoice;
pub mod worker;

use tokio::sync::mpsc;

/// A queued outbound notification
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    pub order_id: i64,
    /// Customer email, if on file
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Sending half of the notification queue, shared with handlers
#[derive(Clone)]
pub struct NotifyService {
    tx: mpsc::Sender<Notification>,
}

impl NotifyService {
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }

    /// Enqueue without waiting. A full or closed queue drops the
    /// notification with a log line; the caller never sees an error.
    pub fn dispatch(&self, notification: Notification) {
        let order_id = notification.order_id;
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!(order_id, error = %e, "Notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(order_id: i64) -> Notification {
        Notification {
            order_id,
            recipient: None,
            subject: "s".into(),
            body: "b".into(),
        }
    }

    #[tokio::test]
    async fn dispatch_never_fails_the_caller() {
        // Closed channel: receiver dropped immediately
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        NotifyService::new(tx).dispatch(note(1));

        // Full channel
        let (tx, mut rx) = mpsc::channel(1);
        let service = NotifyService::new(tx);
        service.dispatch(note(2));
        service.dispatch(note(3)); // dropped, not an error
        assert_eq!(rx.recv().await.unwrap().order_id, 2);
    }
}
