use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{now_naive, repository, Database, DatabaseError};
use crate::models::enums::{NotificationPriority, StaffRole};
use crate::models::Notification;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Webhook request failed: {0}")]
    Webhook(String),

    #[error("Webhook returned status {0}")]
    WebhookStatus(u16),
}

/// One staff notification to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub recipient_role: StaffRole,
    pub recipient_id: String,
    pub patient_id: String,
    pub message: String,
    pub priority: NotificationPriority,
    /// Policy that triggered the notification.
    pub request_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceipt {
    pub delivered: bool,
    pub notification_id: String,
}

/// Delivers staff notifications. Called at most once per decision.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: &NotificationRequest) -> Result<NotificationReceipt, NotifyError>;
}

fn new_notification_id() -> String {
    format!("NTF-{}", Uuid::new_v4().simple())
}

/// Writes notifications to the staff dashboard table.
pub struct DashboardNotifier {
    db: Database,
}

impl DashboardNotifier {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for DashboardNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<NotificationReceipt, NotifyError> {
        let notification = Notification {
            notification_id: new_notification_id(),
            recipient_role: request.recipient_role,
            recipient_id: request.recipient_id.clone(),
            patient_id: request.patient_id.clone(),
            message: request.message.clone(),
            priority: request.priority,
            request_type: request.request_type.clone(),
            channels: request
                .priority
                .channels()
                .into_iter()
                .map(String::from)
                .collect(),
            created_at: now_naive(),
        };
        self.db
            .with_conn(|conn| repository::insert_notification(conn, &notification))?;

        tracing::info!(
            notification_id = %notification.notification_id,
            recipient = %notification.recipient_id,
            priority = %notification.priority,
            channels = ?notification.channels,
            "Dashboard notification stored"
        );

        Ok(NotificationReceipt {
            delivered: true,
            notification_id: notification.notification_id,
        })
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    notification_id: &'a str,
    #[serde(flatten)]
    request: &'a NotificationRequest,
    channels: Vec<&'static str>,
}

/// POSTs each notification as JSON to an external paging endpoint.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: std::time::Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Webhook(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<NotificationReceipt, NotifyError> {
        let notification_id = new_notification_id();
        let payload = WebhookPayload {
            notification_id: &notification_id,
            request,
            channels: request.priority.channels(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Webhook(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::WebhookStatus(status.as_u16()));
        }

        Ok(NotificationReceipt {
            delivered: true,
            notification_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(priority: NotificationPriority) -> NotificationRequest {
        NotificationRequest {
            recipient_role: StaffRole::Nurse,
            recipient_id: "NURSE_001".into(),
            patient_id: "P001".into(),
            message: "Patient P001 needs attention".into(),
            priority,
            request_type: "distress_escalation".into(),
        }
    }

    #[tokio::test]
    async fn dashboard_stores_notification_with_channels() {
        let db = Database::open_in_memory().unwrap();
        let notifier = DashboardNotifier::new(db.clone());

        let receipt = notifier.notify(&request(NotificationPriority::Critical)).await.unwrap();
        assert!(receipt.delivered);
        assert!(receipt.notification_id.starts_with("NTF-"));

        let stored = db
            .with_conn(|conn| repository::list_notifications(conn, Some("NURSE_001"), 10))
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notification_id, receipt.notification_id);
        assert_eq!(stored[0].channels, vec!["dashboard", "mobile_push", "sms"]);
    }

    #[test]
    fn webhook_payload_flattens_request() {
        let req = request(NotificationPriority::Medium);
        let payload = WebhookPayload {
            notification_id: "NTF-1",
            request: &req,
            channels: req.priority.channels(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["notification_id"], "NTF-1");
        assert_eq!(json["recipient_role"], "NURSE");
        assert_eq!(json["priority"], "MEDIUM");
        assert_eq!(json["channels"], serde_json::json!(["dashboard"]));
    }

    #[tokio::test]
    async fn webhook_connection_failure_is_an_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let notifier =
            WebhookNotifier::new("http://127.0.0.1:9/notify", std::time::Duration::from_millis(500))
                .unwrap();
        let result = notifier.notify(&request(NotificationPriority::High)).await;
        assert!(matches!(result, Err(NotifyError::Webhook(_))));
    }
}
