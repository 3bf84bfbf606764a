//! Outbound notifications.
//!
//! Notifications are fire-and-forget: the engine calls them only after the
//! owning transaction has committed, and a notifier has no way to fail the
//! operation.

use uuid::Uuid;

pub trait Notifier: Send + Sync {
    /// New funds reached COMPLETED state against an enrollment, either as a
    /// recorded/captured payment or as the delta of an admin edit. The
    /// collapse rewrite on a paid-amount decrease does not notify.
    fn payment_recorded(&self, enrollment_id: Uuid, amount_minor: i64);

    /// An enrollment's paid amount reached its total.
    fn enrollment_completed(&self, enrollment_id: Uuid);
}

/// Default notifier: structured log lines only.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn payment_recorded(&self, enrollment_id: Uuid, amount_minor: i64) {
        tracing::info!(%enrollment_id, amount_minor, "payment recorded");
    }

    fn enrollment_completed(&self, enrollment_id: Uuid) {
        tracing::info!(%enrollment_id, "enrollment fully paid");
    }
}
