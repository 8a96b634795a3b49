//! Outcome notifications for the presentation layer.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

/// Ephemeral per-operation outcome surfaced to the UI. One per
/// operation completion; consumed, never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeNotification {
    pub message: String,
    pub severity: Severity,
}

/// Broadcast channel of outcome notifications.
///
/// Emitting with no subscribers simply drops the notification; slow
/// subscribers observe `Lagged` rather than blocking operations.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<OutcomeNotification>,
}

/// Default notification channel capacity.
const NOTIFICATION_CAPACITY: usize = 32;

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self { tx }
    }

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<OutcomeNotification> {
        self.tx.subscribe()
    }

    /// Emit a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.emit(message.into(), Severity::Success);
    }

    /// Emit an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(message.into(), Severity::Error);
    }

    fn emit(&self, message: String, severity: Severity) {
        let _ = self.tx.send(OutcomeNotification { message, severity });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_notifications_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("signed up");
        notifier.error("bad password");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.message, "signed up");
        assert_eq!(first.severity, Severity::Success);

        let second = rx.try_recv().unwrap();
        assert_eq!(second.message, "bad password");
        assert_eq!(second.severity, Severity::Error);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let notifier = Notifier::new();
        notifier.success("nobody listening");
    }

    #[test]
    fn test_late_subscriber_misses_earlier_notifications() {
        let notifier = Notifier::new();
        notifier.success("before subscribe");

        let mut rx = notifier.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
