//! Notification sink port — operator-facing messages raised by triggers.

use std::future::Future;

use brewrig_domain::id::NotificationId;

/// Sink for operator notifications that can later be retracted.
pub trait NotificationSink {
    /// Post a message; returns a handle for later retraction.
    fn post(&self, message: String) -> impl Future<Output = NotificationId> + Send;

    /// Retract a previously posted message. Retracting an unknown handle
    /// is a no-op.
    fn retract(&self, id: NotificationId) -> impl Future<Output = ()> + Send;
}
