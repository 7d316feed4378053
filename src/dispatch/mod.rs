//! Acting on policy decisions: staff notification, approval queue, audit.

pub mod audit;
pub mod dispatcher;
pub mod notifier;
#[cfg(test)]
pub mod testing;

pub use audit::{AuditError, AuditSink, SqliteAuditSink};
pub use dispatcher::{route, DispatchError, DispatchInput, DispatchOutcome, EscalationDispatcher};
pub use notifier::{
    DashboardNotifier, NotificationReceipt, NotificationRequest, Notifier, NotifyError,
    WebhookNotifier,
};
