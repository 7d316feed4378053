use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::audit::{AuditError, AuditSink};
use super::notifier::{NotificationRequest, Notifier};
use crate::db::{now_naive, repository, Database};
use crate::models::enums::{
    AlertKind, ApprovalStatus, EscalationLevel, NotificationPriority, NotificationStatus, StaffRole,
};
use crate::models::{
    ApprovalEntry, ClassificationResult, DistressSignal, NewAuditRecord, OperationalAlert,
    PatientContext, PolicyDecision, PolicyId,
};

/// Recipient id used for the hospital emergency response team.
pub const EMERGENCY_TEAM_ID: &str = "EMERGENCY_TEAM";

#[derive(Error, Debug)]
pub enum DispatchError {
    /// The audit trail could not be written. Fatal for the request.
    #[error("Audit write failed: {0}")]
    AuditWriteFailure(#[from] AuditError),
    /// The escalation task panicked or was aborted by the runtime.
    #[error("Dispatch task failed: {0}")]
    TaskFailed(String),
}

/// A decided query, ready to be acted on.
#[derive(Debug, Clone)]
pub struct DispatchInput {
    pub patient: PatientContext,
    pub query_text: String,
    pub classification: ClassificationResult,
    pub distress: DistressSignal,
    pub decision: PolicyDecision,
}

/// What the dispatcher did for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub log_id: String,
    pub notification_status: NotificationStatus,
    pub notification_id: Option<String>,
    pub staff_notified: Vec<String>,
    pub approval_queue_id: Option<String>,
    pub alert_id: Option<String>,
    /// Non-fatal problems, e.g. an approval entry that could not be queued.
    pub warnings: Vec<String>,
}

/// Who gets notified for a decision, and how urgently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub role: StaffRole,
    pub staff_id: String,
    pub priority: NotificationPriority,
}

/// Resolve the notification target. `None` for decisions that stay automatic.
pub fn route(decision: &PolicyDecision, patient: &PatientContext) -> Option<Recipient> {
    match decision.escalation {
        EscalationLevel::None => None,
        EscalationLevel::Nurse => {
            let priority = if decision.primary_policy() == Some(PolicyId::DistressEscalation) {
                NotificationPriority::High
            } else {
                NotificationPriority::Medium
            };
            Some(Recipient {
                role: StaffRole::Nurse,
                staff_id: patient.assigned_nurse_id.clone(),
                priority,
            })
        }
        EscalationLevel::Doctor => Some(Recipient {
            role: StaffRole::Doctor,
            staff_id: patient.assigned_physician_id.clone(),
            priority: NotificationPriority::High,
        }),
        EscalationLevel::Emergency => Some(Recipient {
            role: StaffRole::EmergencyTeam,
            staff_id: EMERGENCY_TEAM_ID.to_string(),
            priority: NotificationPriority::Critical,
        }),
    }
}

fn staff_message(input: &DispatchInput) -> String {
    let policy = input
        .decision
        .primary_policy()
        .map(|p| p.as_str())
        .unwrap_or("unknown");
    format!(
        "[{}] Patient {}: \"{}\" ({})",
        policy, input.patient.id, input.query_text, input.decision.reasoning
    )
}

fn new_queue_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("APR-{}-{}", now_naive().format("%Y%m%d"), &uuid[..8])
}

/// Carries out escalation decisions: notify, queue for approval, audit.
///
/// Shared across requests. Each decision is notified at most once and its
/// audit record is written after the notification attempt has settled.
#[derive(Clone)]
pub struct EscalationDispatcher {
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditSink>,
    db: Database,
    notify_timeout: Duration,
}

impl EscalationDispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditSink>,
        db: Database,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            notifier,
            audit,
            db,
            notify_timeout,
        }
    }

    /// Act on a decision.
    ///
    /// The escalation runs on its own task: once started it completes (or
    /// times out) even if the caller is dropped.
    pub async fn dispatch(&self, input: DispatchInput) -> Result<DispatchOutcome, DispatchError> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.run(input).await })
            .await
            .map_err(|e| DispatchError::TaskFailed(e.to_string()))?
    }

    async fn run(&self, input: DispatchInput) -> Result<DispatchOutcome, DispatchError> {
        let decision = &input.decision;
        let recipient = route(decision, &input.patient);
        let mut warnings = Vec::new();

        // 1. Notify once. No retries.
        let (notification_status, notification_id) = match &recipient {
            None => (NotificationStatus::NotAttempted, None),
            Some(recipient) => self.notify_once(&input, recipient).await,
        };
        let staff_notified = match (&recipient, notification_status) {
            (Some(r), NotificationStatus::Delivered) => vec![r.staff_id.clone()],
            _ => Vec::new(),
        };

        // 2. Approval queue. Emergencies never wait on approval.
        let mut approval_queue_id = None;
        if decision.requires_human_approval && decision.escalation != EscalationLevel::Emergency {
            if let Some(recipient) = &recipient {
                match self.enqueue_approval(&input, recipient) {
                    Ok(queue_id) => approval_queue_id = Some(queue_id),
                    Err(e) => {
                        tracing::warn!(
                            patient_id = %input.patient.id,
                            error = %e,
                            "Failed to enqueue approval entry"
                        );
                        warnings.push(format!("approval enqueue failed: {e}"));
                    }
                }
            }
        }

        // 3. Audit, after the notification has settled.
        let record = NewAuditRecord {
            patient_id: input.patient.id.clone(),
            query_text: input.query_text.clone(),
            classification: input.classification.clone(),
            distress: input.distress.clone(),
            decision: decision.clone(),
            notification_status,
            notification_id: notification_id.clone(),
            staff_notified: staff_notified.clone(),
            approval_queue_id: approval_queue_id.clone(),
        };
        let audit_result = self.audit.append(&record).await;

        // 4. A failed emergency page must reach operators even if auditing failed.
        let mut alert_id = None;
        if decision.escalation == EscalationLevel::Emergency
            && notification_status == NotificationStatus::Failed
        {
            match self.raise_emergency_alert(&input) {
                Ok(id) => alert_id = Some(id),
                Err(e) => warnings.push(format!("operational alert not persisted: {e}")),
            }
        }

        let log_id = match audit_result {
            Ok(log_id) => log_id,
            Err(e) => {
                tracing::error!(
                    patient_id = %input.patient.id,
                    escalation = ?decision.escalation,
                    error = %e,
                    "Audit write failed"
                );
                return Err(DispatchError::AuditWriteFailure(e));
            }
        };

        tracing::info!(
            log_id = %log_id,
            patient_id = %input.patient.id,
            escalation = ?decision.escalation,
            notification = %notification_status,
            approval_queue_id = ?approval_queue_id,
            "Decision dispatched"
        );

        Ok(DispatchOutcome {
            log_id,
            notification_status,
            notification_id,
            staff_notified,
            approval_queue_id,
            alert_id,
            warnings,
        })
    }

    async fn notify_once(
        &self,
        input: &DispatchInput,
        recipient: &Recipient,
    ) -> (NotificationStatus, Option<String>) {
        let request = NotificationRequest {
            recipient_role: recipient.role,
            recipient_id: recipient.staff_id.clone(),
            patient_id: input.patient.id.clone(),
            message: staff_message(input),
            priority: recipient.priority,
            request_type: input
                .decision
                .primary_policy()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        };

        match tokio::time::timeout(self.notify_timeout, self.notifier.notify(&request)).await {
            Ok(Ok(receipt)) if receipt.delivered => {
                (NotificationStatus::Delivered, Some(receipt.notification_id))
            }
            Ok(Ok(receipt)) => {
                tracing::warn!(
                    patient_id = %input.patient.id,
                    notification_id = %receipt.notification_id,
                    "Notifier reported non-delivery"
                );
                (NotificationStatus::Failed, Some(receipt.notification_id))
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    patient_id = %input.patient.id,
                    recipient = %recipient.staff_id,
                    error = %e,
                    "Notification failed"
                );
                (NotificationStatus::Failed, None)
            }
            Err(_) => {
                tracing::warn!(
                    patient_id = %input.patient.id,
                    recipient = %recipient.staff_id,
                    timeout_ms = self.notify_timeout.as_millis() as u64,
                    "Notification timed out"
                );
                (NotificationStatus::Failed, None)
            }
        }
    }

    fn enqueue_approval(
        &self,
        input: &DispatchInput,
        recipient: &Recipient,
    ) -> Result<String, crate::db::DatabaseError> {
        let entry = ApprovalEntry {
            queue_id: new_queue_id(),
            patient_id: input.patient.id.clone(),
            query_text: input.query_text.clone(),
            request_type: input
                .decision
                .primary_policy()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
            assigned_to: recipient.staff_id.clone(),
            priority: recipient.priority,
            sla_minutes: recipient.priority.sla_minutes(),
            status: ApprovalStatus::Pending,
            created_at: now_naive(),
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
        };
        self.db
            .with_conn(|conn| repository::insert_approval(conn, &entry))?;
        Ok(entry.queue_id)
    }

    fn raise_emergency_alert(&self, input: &DispatchInput) -> Result<String, crate::db::DatabaseError> {
        let alert = OperationalAlert {
            id: format!("ALERT-{}", Uuid::new_v4().simple()),
            kind: AlertKind::EmergencyNotificationFailed,
            patient_id: input.patient.id.clone(),
            detail: format!(
                "Emergency notification to {EMERGENCY_TEAM_ID} failed for query \"{}\"",
                input.query_text
            ),
            created_at: now_naive(),
        };

        tracing::error!(
            alert_id = %alert.id,
            patient_id = %input.patient.id,
            kind = %alert.kind,
            "Emergency notification failed"
        );

        self.db
            .with_conn(|conn| repository::insert_operational_alert(conn, &alert))?;
        Ok(alert.id)
    }
}
