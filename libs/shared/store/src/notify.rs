use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Outbound notification after a successful scheduling mutation. Delivery is
/// fire-and-forget: a dispatcher failure must never roll back the mutation
/// that triggered it.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub appointment_id: String,
    pub requester_id: Uuid,
    pub provider_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Booked,
    Cancelled,
    Rescheduled,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: NotificationEvent);
}

/// Default dispatcher: records the event in the log stream. The email/SMS
/// gateway sits behind a real dispatcher in deployment.
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, event: NotificationEvent) {
        info!(
            "Notification {:?} for appointment {} (requester {}, provider {})",
            event.kind, event.appointment_id, event.requester_id, event.provider_id
        );
    }
}
