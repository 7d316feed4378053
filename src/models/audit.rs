use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::decision::PolicyDecision;
use super::enums::{EscalationLevel, NotificationStatus, ResolutionStatus};
use super::signals::{ClassificationResult, DistressSignal};

/// Everything the dispatcher knows about a decision once notification has
/// settled. Appended exactly once; the store assigns identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    pub patient_id: String,
    pub query_text: String,
    pub classification: ClassificationResult,
    pub distress: DistressSignal,
    pub decision: PolicyDecision,
    pub notification_status: NotificationStatus,
    pub notification_id: Option<String>,
    pub staff_notified: Vec<String>,
    pub approval_queue_id: Option<String>,
}

impl NewAuditRecord {
    pub fn resolution_status(&self) -> ResolutionStatus {
        if self.decision.escalation == EscalationLevel::Emergency {
            ResolutionStatus::Escalated
        } else if self.decision.requires_human_approval {
            ResolutionStatus::Pending
        } else {
            ResolutionStatus::Completed
        }
    }
}

/// Immutable, monotonically identified audit entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub seq: i64,
    pub log_id: String,
    #[serde(flatten)]
    pub entry: NewAuditRecord,
    pub resolution_status: ResolutionStatus,
    pub created_at: NaiveDateTime,
}

/// Log id derived from the store sequence number.
pub fn log_id_for(seq: i64) -> String {
    format!("LOG-{seq:08}")
}
