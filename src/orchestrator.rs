//! End-to-end handling of one patient query.
//!
//! Load context, extract signals, evaluate policy, dispatch, reply, remember.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::composer::ResponseComposer;
use crate::db::{now_naive, repository, Database, DatabaseError};
use crate::dispatch::{DispatchError, DispatchInput, DispatchOutcome, EscalationDispatcher};
use crate::intelligence::{
    count_similar, is_medication_request, ClassifierError, DistressDetector, IntentClassifier,
};
use crate::models::{ClassificationResult, DistressSignal, InteractionTurn, PolicyDecision};
use crate::policy::{self, PolicyError, PolicyInput};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Query text is empty")]
    EmptyQuery,

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl From<DatabaseError> for OrchestratorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } if entity_type == "patient" => {
                OrchestratorError::PatientNotFound(id)
            }
            other => OrchestratorError::Database(other),
        }
    }
}

/// Result of processing one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub patient_id: String,
    pub response: String,
    pub classification: ClassificationResult,
    pub distress: DistressSignal,
    pub decision: PolicyDecision,
    pub dispatch: DispatchOutcome,
    pub is_medication_request: bool,
    pub interaction_id: Option<String>,
}

pub struct CareOrchestrator {
    db: Database,
    classifier: Arc<dyn IntentClassifier>,
    distress: DistressDetector,
    composer: Arc<dyn ResponseComposer>,
    dispatcher: Arc<EscalationDispatcher>,
    memory_window: usize,
}

impl CareOrchestrator {
    pub fn new(
        db: Database,
        classifier: Arc<dyn IntentClassifier>,
        composer: Arc<dyn ResponseComposer>,
        dispatcher: Arc<EscalationDispatcher>,
        memory_window: usize,
    ) -> Self {
        Self {
            db,
            classifier,
            distress: DistressDetector,
            composer,
            dispatcher,
            memory_window,
        }
    }

    pub fn dispatcher(&self) -> &Arc<EscalationDispatcher> {
        &self.dispatcher
    }

    pub async fn process_query(
        &self,
        patient_id: &str,
        text: &str,
    ) -> Result<QueryOutcome, OrchestratorError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(OrchestratorError::EmptyQuery);
        }

        // Context and memory
        let patient = self
            .db
            .with_conn(|conn| repository::require_patient(conn, patient_id))?;
        let history = self.db.with_conn(|conn| {
            repository::recent_interactions(conn, patient_id, self.memory_window)
        })?;
        let prior_queries: Vec<&str> = history.iter().map(|t| t.query.as_str()).collect();
        let repetition_count = count_similar(text, &prior_queries, self.memory_window);

        // Signals
        let (classification, distress) = tokio::join!(
            self.classifier.classify(text, &patient.context),
            async { self.distress.detect(text, repetition_count) }
        );
        let classification = classification?;
        let medication = is_medication_request(text, &patient.context);

        // Decision
        let input = PolicyInput {
            intent: classification.intent,
            distress: distress.level,
            repetition_count: i64::from(repetition_count),
            is_medication_request: medication,
            patient: patient.context.clone(),
        };
        let decision = policy::evaluate(&input)?;

        tracing::info!(
            patient_id = %patient_id,
            intent = %classification.intent,
            distress = %distress.level,
            repetition_count,
            medication,
            escalation = ?decision.escalation,
            "Query evaluated"
        );

        let dispatch = self
            .dispatcher
            .dispatch(DispatchInput {
                patient: patient.context.clone(),
                query_text: text.to_string(),
                classification: classification.clone(),
                distress: distress.clone(),
                decision: decision.clone(),
            })
            .await?;

        let response = self.composer.compose(
            text,
            &classification,
            &decision,
            dispatch.notification_status,
        );

        // Memory write is best effort; the decision is already audited.
        let turn = InteractionTurn {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            query: text.to_string(),
            response: response.clone(),
            intent: classification.intent,
            escalation: decision.escalation,
            created_at: now_naive(),
        };
        let interaction_id = match self
            .db
            .with_conn(|conn| repository::append_interaction(conn, &turn))
        {
            Ok(()) => Some(turn.id),
            Err(e) => {
                tracing::warn!(patient_id = %patient_id, error = %e, "Failed to store interaction");
                None
            }
        };

        Ok(QueryOutcome {
            patient_id: patient_id.to_string(),
            response,
            classification,
            distress,
            decision,
            dispatch,
            is_medication_request: medication,
            interaction_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::composer::TemplateComposer;
    use crate::dispatch::testing::{NotifyScript, ScriptedNotifier};
    use crate::dispatch::SqliteAuditSink;
    use crate::intelligence::HybridClassifier;
    use crate::models::enums::{ApprovalStatus, EscalationLevel, Intent, NotificationStatus, StaffRole};
    use crate::models::{PatientContext, PatientRecord, PolicyId};

    struct Harness {
        db: Database,
        notifier: Arc<ScriptedNotifier>,
        orchestrator: CareOrchestrator,
    }

    fn harness() -> Harness {
        harness_with(NotifyScript::Deliver)
    }

    fn harness_with(script: NotifyScript) -> Harness {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            repository::upsert_patient(
                conn,
                &PatientRecord {
                    context: PatientContext {
                        id: "P001".into(),
                        medications: vec!["Metformin 500mg".into()],
                        allergies: vec!["Penicillin".into()],
                        assigned_nurse_id: "NURSE_001".into(),
                        assigned_physician_id: "DR_001".into(),
                    },
                    name: "Jane Doe".into(),
                    bed_number: "12A".into(),
                    language: "en".into(),
                },
            )
        })
        .unwrap();

        let notifier = Arc::new(ScriptedNotifier::new(script));
        let dispatcher = Arc::new(EscalationDispatcher::new(
            notifier.clone(),
            Arc::new(SqliteAuditSink::new(db.clone())),
            db.clone(),
            Duration::from_millis(200),
        ));
        let orchestrator = CareOrchestrator::new(
            db.clone(),
            Arc::new(HybridClassifier::keyword_only()),
            Arc::new(TemplateComposer),
            dispatcher,
            10,
        );
        Harness {
            db,
            notifier,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let h = harness();
        let err = h.orchestrator.process_query("P001", "   ").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyQuery));
    }

    #[tokio::test]
    async fn unknown_patient_is_not_found() {
        let h = harness();
        let err = h.orchestrator.process_query("P999", "water").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::PatientNotFound(id) if id == "P999"));
    }

    #[tokio::test]
    async fn comfort_request_is_answered_automatically() {
        let h = harness();
        let out = h
            .orchestrator
            .process_query("P001", "Can I get some water?")
            .await
            .unwrap();

        assert_eq!(out.classification.intent, Intent::NonMedical);
        assert_eq!(out.decision.escalation, EscalationLevel::None);
        assert_eq!(out.dispatch.notification_status, NotificationStatus::NotAttempted);
        assert!(out.response.contains("water"));
        assert!(h.notifier.calls().is_empty());

        let turns = h
            .db
            .with_conn(|conn| repository::recent_interactions(conn, "P001", 10))
            .unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(Some(turns[0].id.clone()), out.interaction_id);
    }

    #[tokio::test]
    async fn medication_request_goes_to_nurse_for_approval() {
        let h = harness();
        let out = h
            .orchestrator
            .process_query("P001", "Can I have my metformin now?")
            .await
            .unwrap();

        assert!(out.is_medication_request);
        assert_eq!(out.decision.matched_policies, vec![PolicyId::MedicationRequiresApproval]);
        assert!(out.response.contains("notified your nurse"));

        let pending = h
            .db
            .with_conn(|conn| repository::list_approvals(conn, ApprovalStatus::Pending, 10))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].assigned_to, "NURSE_001");
    }

    #[tokio::test]
    async fn emergency_pages_the_team() {
        let h = harness();
        let out = h
            .orchestrator
            .process_query("P001", "I have chest pain")
            .await
            .unwrap();

        assert_eq!(out.decision.escalation, EscalationLevel::Emergency);
        assert!(!out.decision.requires_human_approval);
        assert_eq!(h.notifier.calls()[0].recipient_role, StaffRole::EmergencyTeam);
        assert!(out.dispatch.approval_queue_id.is_none());
        assert!(out.response.contains("notified the emergency response team"));
    }

    #[tokio::test]
    async fn unreached_emergency_team_is_not_claimed() {
        let h = harness_with(NotifyScript::Fail);
        let out = h
            .orchestrator
            .process_query("P001", "I have chest pain")
            .await
            .unwrap();

        assert_eq!(out.dispatch.notification_status, NotificationStatus::Failed);
        assert!(out.dispatch.alert_id.is_some());
        assert!(!out.response.contains("notified"));
        assert!(out.response.contains("call button"));
    }

    #[tokio::test]
    async fn repeated_requests_escalate() {
        let h = harness();
        for _ in 0..3 {
            h.orchestrator
                .process_query("P001", "can I get some water")
                .await
                .unwrap();
        }
        let out = h
            .orchestrator
            .process_query("P001", "can I get some water")
            .await
            .unwrap();

        assert_eq!(out.distress.repetition_count, 3);
        assert_eq!(out.decision.matched_policies, vec![PolicyId::RepeatedRequestEscalation]);
        assert_eq!(out.decision.escalation, EscalationLevel::Nurse);
        assert!(!out.decision.requires_human_approval);
    }

    #[tokio::test]
    async fn every_query_is_audited_once() {
        let h = harness();
        h.orchestrator.process_query("P001", "turn off the lights").await.unwrap();
        h.orchestrator.process_query("P001", "I feel dizzy").await.unwrap();
        let audit = h
            .db
            .with_conn(|conn| repository::query_audit_by_patient(conn, "P001", 10))
            .unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].log_id, "LOG-00000002");
    }
}
