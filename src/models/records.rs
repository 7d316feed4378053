//! Persisted rows: interaction memory, approval queue, staff notifications,
//! operational alerts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{
    AlertKind, ApprovalStatus, EscalationLevel, Intent, NotificationPriority, StaffRole,
};

/// One prior query/response pair in a patient's interaction memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionTurn {
    pub id: String,
    pub patient_id: String,
    pub query: String,
    pub response: String,
    pub intent: Intent,
    pub escalation: EscalationLevel,
    pub created_at: NaiveDateTime,
}

/// Staff review entry for an approval-gated decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub queue_id: String,
    pub patient_id: String,
    pub query_text: String,
    pub request_type: String,
    pub assigned_to: String,
    pub priority: NotificationPriority,
    pub sla_minutes: u32,
    pub status: ApprovalStatus,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
}

/// A notification delivered to the staff dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub recipient_role: StaffRole,
    pub recipient_id: String,
    pub patient_id: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub request_type: String,
    pub channels: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Condition an operator must act on (e.g. an emergency page that never landed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalAlert {
    pub id: String,
    pub kind: AlertKind,
    pub patient_id: String,
    pub detail: String,
    pub created_at: NaiveDateTime,
}
